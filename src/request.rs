//! Incoming HTTP request type.
//!
//! A [`Request`] is split into a cheap-to-clone [`RequestHead`] and the body.
//! Handlers consume the whole request, so the logging middleware keeps its
//! own copy of the head to render the access line once the handler is done.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

/// Everything about a request except its body.
#[derive(Clone, Debug)]
pub struct RequestHead {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl RequestHead {
    /// The head of a request received from `remote_addr`.
    pub(crate) fn from_parts(parts: Parts, remote_addr: SocketAddr) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            remote_addr: Some(remote_addr),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Address of the connected peer, if the transport knows it.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An incoming HTTP request.
#[derive(Debug)]
pub struct Request {
    pub(crate) head: RequestHead,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(head: RequestHead, body: Bytes) -> Self {
        Self { head, body }
    }

    /// Builder for requests assembled outside the server, e.g. in tests.
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            head: RequestHead {
                method: Method::GET,
                uri: Uri::from_static("/"),
                version: Version::HTTP_11,
                headers: HeaderMap::new(),
                remote_addr: None,
            },
            body: Bytes::new(),
        }
    }

    pub fn head(&self) -> &RequestHead { &self.head }
    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`]. Defaults to `GET / HTTP/1.1`, no headers,
/// no peer address and an empty body.
pub struct RequestBuilder {
    head: RequestHead,
    body: Bytes,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.head.method = method;
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.head.uri = uri;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.head.version = version;
        self
    }

    /// Appends a header.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header name or value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name)
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::from_bytes(value.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header value `{value}`: {e}"));
        self.head.headers.append(name, value);
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.head.remote_addr = Some(addr);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request::new(self.head, self.body)
    }
}
