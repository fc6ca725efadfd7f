//! Field resolution: one token plus one exchange gives one string.

use chrono::{DateTime, SecondsFormat, Utc};
use http::{header, HeaderMap};

use crate::auth;
use crate::error::Error;
use crate::exchange::Exchange;
use crate::format::style::Style;
use crate::format::template::{Field, Token};
use crate::middleware::X_RESPONSE_TIME;

/// Placeholder for data the exchange does not have.
const MISSING: &str = "-";

/// Decimal places of `:response-time` when no argument is given.
const DEFAULT_DIGITS: usize = 3;

/// Upper bound for the `:response-time` argument.
const MAX_DIGITS: usize = 100;

/// Turns tokens into values.
///
/// [`Template::render_with`](crate::format::Template::render_with) calls this
/// once per distinct token. `Ok(None)` means the token is not recognised and
/// its raw text stays in the line.
pub trait Resolve {
    fn resolve(&self, token: &Token, exchange: &Exchange<'_>) -> Result<Option<String>, Error>;
}

/// The built-in resolver for the standard vocabulary.
///
/// The clock is read once, when the resolver is created, so every `:date`
/// token of a line shows the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FieldResolver {
    debug: bool,
    now: DateTime<Utc>,
}

impl FieldResolver {
    pub fn new(debug: bool) -> Self {
        Self::at(debug, Utc::now())
    }

    /// A resolver whose `:date` tokens show `now`.
    pub fn at(debug: bool, now: DateTime<Utc>) -> Self {
        Self { debug, now }
    }

    /// Resolves a single field, applying debug decoration last.
    pub fn field(&self, field: Field, arg: Option<&str>, exchange: &Exchange<'_>) -> Result<String, Error> {
        let request = exchange.request();
        let response = exchange.response();

        let value = match field {
            Field::Date => self.date(arg)?,
            Field::HttpVersion => {
                let protocol = format!("{:?}", request.version());
                match protocol.strip_prefix("HTTP/") {
                    Some(version) => version.to_owned(),
                    None => protocol,
                }
            }
            Field::Method => request.method().as_str().to_owned(),
            Field::Referrer => or_missing(header_text(request.headers(), header::REFERER.as_str())),
            Field::RemoteAddr => request.remote_addr()
                .map_or_else(|| MISSING.to_owned(), |addr| addr.ip().to_string()),
            Field::RemoteUser => auth::basic_user(request.headers())
                .unwrap_or_else(|| MISSING.to_owned()),
            Field::Request => or_missing(arg.and_then(|name| header_text(request.headers(), name))),
            Field::Response => or_missing(arg.and_then(|name| header_text(response.headers(), name))),
            Field::ResponseTime => {
                let digits = arg
                    .and_then(|digits| digits.parse::<usize>().ok())
                    .map_or(DEFAULT_DIGITS, |digits| digits.min(MAX_DIGITS));
                match response.header(X_RESPONSE_TIME.as_str()).and_then(|ms| ms.trim().parse::<f64>().ok()) {
                    Some(ms) => format!("{ms:.digits$}"),
                    None => MISSING.to_owned(),
                }
            }
            Field::Status => response.status_code()
                .map_or_else(|| MISSING.to_owned(), |status| status.as_u16().to_string()),
            Field::Url => request.uri().to_string(),
            Field::UserAgent => header_text(request.headers(), header::USER_AGENT.as_str())
                .unwrap_or_default(),
        };

        if !self.debug {
            return Ok(value);
        }
        Ok(match Style::for_field(field, &value) {
            Some(style) => style.paint(&value),
            None => value,
        })
    }

    fn date(&self, style: Option<&str>) -> Result<String, Error> {
        match style {
            Some("clf") => Ok(self.now.format("%d/%b/%Y:%H:%M:%S %:z").to_string()),
            Some("iso") => Ok(self.now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Some("web") => Ok(self.now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
            other => Err(Error::DateFormat(other.unwrap_or_default().to_owned())),
        }
    }
}

impl Resolve for FieldResolver {
    fn resolve(&self, token: &Token, exchange: &Exchange<'_>) -> Result<Option<String>, Error> {
        match token.field() {
            Some(field) => self.field(field, token.arg(), exchange).map(Some),
            None => Ok(None),
        }
    }
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING.to_owned())
}

/// Every value of header `name`, joined with `, `. Bytes that are not UTF-8
/// are replaced rather than hiding the header.
fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<_> = headers
        .get_all(name)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use console::strip_ansi_codes;
    use http::{Method, StatusCode, Uri, Version};

    use crate::request::Request;
    use crate::response::Response;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 10, 10, 13, 55, 36).unwrap()
    }

    fn resolve(field: Field, arg: Option<&str>, req: &Request, res: &Response) -> String {
        FieldResolver::at(false, instant())
            .field(field, arg, &Exchange::new(req.head(), res))
            .unwrap()
    }

    fn timed(ms: &str) -> Response {
        Response::builder().header("x-response-time", ms).no_body()
    }

    #[test]
    fn date_styles() {
        let req = Request::builder().build();
        let res = Response::default();
        assert_eq!(resolve(Field::Date, Some("clf"), &req, &res), "10/Oct/2000:13:55:36 +00:00");
        assert_eq!(resolve(Field::Date, Some("iso"), &req, &res), "2000-10-10T13:55:36.000Z");
        assert_eq!(resolve(Field::Date, Some("web"), &req, &res), "Tue, 10 Oct 2000 13:55:36 GMT");
    }

    #[test]
    fn unsupported_date_style() {
        let req = Request::builder().build();
        let res = Response::default();
        let exchange = Exchange::new(req.head(), &res);
        let resolver = FieldResolver::at(false, instant());

        let err = resolver.field(Field::Date, Some("bogus"), &exchange).unwrap_err();
        assert!(matches!(err, Error::DateFormat(ref style) if style == "bogus"));
        let err = resolver.field(Field::Date, None, &exchange).unwrap_err();
        assert!(matches!(err, Error::DateFormat(ref style) if style.is_empty()));
    }

    #[test]
    fn request_line_fields() {
        let req = Request::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/users?page=2"))
            .version(Version::HTTP_10)
            .remote_addr("10.0.0.7:51234".parse().unwrap())
            .build();
        let res = Response::default();
        assert_eq!(resolve(Field::Method, None, &req, &res), "POST");
        assert_eq!(resolve(Field::Url, None, &req, &res), "/users?page=2");
        assert_eq!(resolve(Field::HttpVersion, None, &req, &res), "1.0");
        assert_eq!(resolve(Field::RemoteAddr, None, &req, &res), "10.0.0.7");
    }

    #[test]
    fn http2_version() {
        let req = Request::builder().version(Version::HTTP_2).build();
        assert_eq!(resolve(Field::HttpVersion, None, &req, &Response::default()), "2.0");
    }

    #[test]
    fn missing_data_degrades() {
        let req = Request::builder().build();
        let res = Response::default();
        assert_eq!(resolve(Field::Referrer, None, &req, &res), "-");
        assert_eq!(resolve(Field::RemoteAddr, None, &req, &res), "-");
        assert_eq!(resolve(Field::RemoteUser, None, &req, &res), "-");
        assert_eq!(resolve(Field::Request, Some("x-request-id"), &req, &res), "-");
        assert_eq!(resolve(Field::Request, None, &req, &res), "-");
        assert_eq!(resolve(Field::Response, Some("content-length"), &req, &res), "-");
        assert_eq!(resolve(Field::ResponseTime, None, &req, &res), "-");
        assert_eq!(resolve(Field::Status, None, &req, &res), "-");
        assert_eq!(resolve(Field::UserAgent, None, &req, &res), "");
    }

    #[test]
    fn header_fields() {
        let req = Request::builder()
            .header("referer", "https://example.com/")
            .header("user-agent", "curl/8.5.0")
            .header("x-request-id", "abc-123")
            .header("authorization", "Basic YWxpY2U6c2VjcmV0")
            .build();
        let res = Response::text("hello");
        assert_eq!(resolve(Field::Referrer, None, &req, &res), "https://example.com/");
        assert_eq!(resolve(Field::UserAgent, None, &req, &res), "curl/8.5.0");
        assert_eq!(resolve(Field::Request, Some("X-Request-Id"), &req, &res), "abc-123");
        assert_eq!(resolve(Field::RemoteUser, None, &req, &res), "alice");
        assert_eq!(resolve(Field::Response, Some("Content-Length"), &req, &res), "5");
        assert_eq!(resolve(Field::Status, None, &req, &res), "200");
    }

    #[test]
    fn non_ascii_headers_are_kept() {
        let req = Request::builder()
            .header("user-agent", "Mozilla/5.0 (café)")
            .header("referer", "https://example.com/ü")
            .build();
        let res = Response::default();
        assert_eq!(resolve(Field::UserAgent, None, &req, &res), "Mozilla/5.0 (café)");
        assert_eq!(resolve(Field::Referrer, None, &req, &res), "https://example.com/ü");
        assert_eq!(resolve(Field::Request, Some("user-agent"), &req, &res), "Mozilla/5.0 (café)");
    }

    #[test]
    fn repeated_headers_are_joined() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.0.0.1")
            .header("x-forwarded-for", "10.0.0.2")
            .build();
        let res = Response::builder()
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .no_body();
        assert_eq!(resolve(Field::Request, Some("x-forwarded-for"), &req, &res), "10.0.0.1, 10.0.0.2");
        assert_eq!(resolve(Field::Response, Some("Set-Cookie"), &req, &res), "a=1, b=2");
    }

    #[test]
    fn url_is_the_raw_target() {
        let res = Response::default();
        let absolute = Request::builder().uri(Uri::from_static("http://upstream.internal/a?b=1")).build();
        assert_eq!(resolve(Field::Url, None, &absolute, &res), "http://upstream.internal/a?b=1");

        let connect = Request::builder()
            .method(Method::CONNECT)
            .uri(Uri::from_static("example.com:443"))
            .build();
        assert_eq!(resolve(Field::Url, None, &connect, &res), "example.com:443");
    }

    #[test]
    fn response_time_digits() {
        let req = Request::builder().build();
        let res = timed("12.3456");
        assert_eq!(resolve(Field::ResponseTime, None, &req, &res), "12.346");
        assert_eq!(resolve(Field::ResponseTime, Some("0"), &req, &res), "12");
        assert_eq!(resolve(Field::ResponseTime, Some("1"), &req, &res), "12.3");
        assert_eq!(resolve(Field::ResponseTime, Some("6"), &req, &res), "12.345600");
        assert_eq!(resolve(Field::ResponseTime, Some("fast"), &req, &res), "12.346");
        assert_eq!(resolve(Field::ResponseTime, Some(""), &req, &res), "12.346");
    }

    #[test]
    fn unparsable_response_time() {
        let req = Request::builder().build();
        assert_eq!(resolve(Field::ResponseTime, None, &req, &timed("soon")), "-");
    }

    #[test]
    fn debug_decoration_preserves_values() {
        let req = Request::builder().uri(Uri::from_static("/health")).build();
        let res = Response::builder()
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .header("x-response-time", "4")
            .no_body();
        let exchange = Exchange::new(req.head(), &res);
        let plain = FieldResolver::at(false, instant());
        let debug = FieldResolver::at(true, instant());

        for field in Field::ALL {
            let arg = match field {
                Field::Date => Some("iso"),
                Field::Request | Field::Response => Some("content-length"),
                _ => None,
            };
            let plain = plain.field(field, arg, &exchange).unwrap();
            let decorated = debug.field(field, arg, &exchange).unwrap();
            assert_eq!(strip_ansi_codes(&decorated), plain, "{field}");
            assert_eq!(decorated != plain, Style::for_field(field, &plain).is_some(), "{field}");
        }
    }

    #[test]
    fn unknown_token_is_not_resolved() {
        let req = Request::builder().build();
        let res = Response::default();
        let template = crate::format::Template::parse(":bogus");
        let resolved = FieldResolver::new(false)
            .resolve(&template.tokens()[0], &Exchange::new(req.head(), &res))
            .unwrap();
        assert_eq!(resolved, None);
    }
}
