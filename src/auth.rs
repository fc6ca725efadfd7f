//! User identity from `Authorization` credentials.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use http::{header, HeaderMap};

/// Extracts the user name from `Authorization: Basic <credentials>`.
///
/// Returns `None` for other schemes and for credentials that do not decode
/// to UTF-8 `name:password`. The password is never looked at.
pub fn basic_user(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credentials) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(credentials.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, _) = decoded.split_once(':')?;
    Some(name.to_owned())
}
