//! The read-only view of one request/response pair.

use crate::request::RequestHead;
use crate::response::Response;

/// What the access log sees of a finished request.
///
/// Both halves are borrowed for the duration of one render; nothing here is
/// copied or mutated.
#[derive(Clone, Copy, Debug)]
pub struct Exchange<'a> {
    request: &'a RequestHead,
    response: &'a Response,
}

impl<'a> Exchange<'a> {
    pub fn new(request: &'a RequestHead, response: &'a Response) -> Self {
        Self { request, response }
    }

    pub fn request(&self) -> &'a RequestHead { self.request }
    pub fn response(&self) -> &'a Response { self.response }
}
