//! The token-substitution engine.
//!
//! A format is either a raw template such as
//! `":method :url :status :response-time[1] ms"` or the name of a
//! [`Preset`]. Tokens:
//!
//! | Token | Argument | Value |
//! |---|---|---|
//! | `:date[style]` | `clf`, `iso` or `web` (required) | current UTC time |
//! | `:http-version` | | protocol version without `HTTP/` |
//! | `:method` | | request method |
//! | `:referrer` | | `Referer` header or `-` |
//! | `:remote-addr` | | client IP or `-` |
//! | `:remote-user` | | Basic-auth user name or `-` |
//! | `:request[name]` | header name | request header or `-` |
//! | `:response[name]` | header name | response header or `-` |
//! | `:response-time[digits]` | decimals, default 3 | `X-Response-Time` in ms or `-` |
//! | `:status` | | status code or `-` |
//! | `:url` | | request target |
//! | `:user-agent` | | `User-Agent` header, empty if absent |
//!
//! Unknown tokens are copied to the output unchanged, unless the format was
//! parsed with [`Format::parse_strict`].

mod preset;
mod resolve;
mod style;
mod template;

pub use preset::Preset;
pub use resolve::{FieldResolver, Resolve};
pub use style::Style;
pub use template::{Field, Template, Token};

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::exchange::Exchange;
use crate::sink::{Sink, Stdout};

/// A parsed format, ready to render any number of exchanges.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Format {
    template: Template,
    preset: Option<Preset>,
}

impl Format {
    /// Expands a preset name (once) and parses the resulting template.
    pub fn parse(source: &str) -> Self {
        let preset = Preset::from_name(source);
        let template = Template::parse(preset.map_or(source, |preset| preset.template()));
        Self { template, preset }
    }

    /// Like [`Format::parse`], but rejects unknown tokens and invalid `:date`
    /// styles up front instead of passing them through or failing per line.
    pub fn parse_strict(source: &str) -> Result<Self, Error> {
        let format = Self::parse(source);
        if let Some((_, err)) = format.invalid_tokens().next() {
            return Err(err);
        }
        Ok(format)
    }

    /// Tokens that are unknown or would fail every render, with the reason.
    pub fn invalid_tokens(&self) -> impl Iterator<Item = (&Token, Error)> {
        self.template.tokens().iter().filter_map(|token| match token.field() {
            None => Some((token, Error::UnknownToken(token.text().to_owned()))),
            Some(Field::Date) if !matches!(token.arg(), Some("clf" | "iso" | "web")) => {
                Some((token, Error::DateFormat(token.arg().unwrap_or_default().to_owned())))
            }
            Some(_) => None,
        })
    }

    pub fn template(&self) -> &Template { &self.template }

    /// The preset this format was expanded from, if any.
    pub fn preset(&self) -> Option<Preset> { self.preset }

    /// Whether this format decorates its output regardless of the caller.
    pub fn forces_debug(&self) -> bool {
        self.preset.is_some_and(Preset::forces_debug)
    }

    /// Renders one line for `exchange`, dated now.
    pub fn render(&self, exchange: &Exchange<'_>, debug: bool) -> Result<String, Error> {
        self.render_at(exchange, debug, Utc::now())
    }

    /// Renders one line for `exchange` with `:date` tokens showing `now`.
    pub fn render_at(&self, exchange: &Exchange<'_>, debug: bool, now: DateTime<Utc>) -> Result<String, Error> {
        let resolver = FieldResolver::at(debug || self.forces_debug(), now);
        self.template.render_with(&resolver, exchange)
    }
}

/// Renders `format` (a template or preset name) for one exchange.
///
/// Fails only with [`Error::DateFormat`], when a `:date` token carries an
/// unsupported style.
pub fn render(format: &str, exchange: &Exchange<'_>, debug: bool) -> Result<String, Error> {
    Format::parse(format).render(exchange, debug)
}

/// Renders `format` and writes the line to standard output.
pub fn log_line(format: &str, exchange: &Exchange<'_>, debug: bool) -> Result<(), Error> {
    let line = render(format, exchange, debug)?;
    Stdout.write_line(&line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::TimeZone;
    use http::{StatusCode, Uri};

    use crate::request::Request;
    use crate::response::Response;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap()
    }

    /// Counts how often each token text is resolved.
    struct Counting {
        inner: FieldResolver,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl Resolve for Counting {
        fn resolve(&self, token: &Token, exchange: &Exchange<'_>) -> Result<Option<String>, Error> {
            *self.calls.borrow_mut().entry(token.text().to_owned()).or_default() += 1;
            self.inner.resolve(token, exchange)
        }
    }

    #[test]
    fn literal_text_is_unchanged() {
        let req = Request::builder().build();
        let res = Response::default();
        let exchange = Exchange::new(req.head(), &res);
        for literal in ["", "plain text", "a: b :: c", "ratio 3:2\nNEXT:\tline", "ünïcode: ☃"] {
            assert_eq!(render(literal, &exchange, false).unwrap(), literal);
            assert_eq!(render(literal, &exchange, true).unwrap(), literal);
        }
    }

    #[test]
    fn repeated_tokens_resolve_once() {
        let req = Request::builder().build();
        let res = Response::status(StatusCode::ACCEPTED);
        let exchange = Exchange::new(req.head(), &res);
        let counting = Counting {
            inner: FieldResolver::new(false),
            calls: RefCell::default(),
        };

        let template = Template::parse(":status :status [:status]");
        let line = template.render_with(&counting, &exchange).unwrap();

        assert_eq!(line, "202 202 [202]");
        assert_eq!(counting.calls.borrow()[":status"], 1);
    }

    #[test]
    fn resolved_values_are_not_rescanned() {
        // A URL that itself looks like a token must come out verbatim.
        let req = Request::builder().uri(Uri::from_static("/:status")).build();
        let res = Response::status(StatusCode::OK);
        let exchange = Exchange::new(req.head(), &res);
        assert_eq!(render(":url :status", &exchange, false).unwrap(), "/:status 200");
    }

    #[test]
    fn prefix_tokens_do_not_interfere() {
        let req = Request::builder().build();
        let res = Response::builder()
            .header("x-response-time", "7.5")
            .text("12345");
        let exchange = Exchange::new(req.head(), &res);
        let line = render(":response[content-length]|:response-time|:response[content-type]", &exchange, false);
        assert_eq!(line.unwrap(), "5|7.500|text/plain; charset=utf-8");
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let req = Request::builder().build();
        let res = Response::status(StatusCode::OK);
        let exchange = Exchange::new(req.head(), &res);
        assert_eq!(
            render(":status :bogus :thing[arg] :status-code", &exchange, false).unwrap(),
            "200 :bogus :thing[arg] :status-code"
        );
    }

    #[test]
    fn bad_date_style_aborts_the_render() {
        let req = Request::builder().build();
        let res = Response::default();
        let exchange = Exchange::new(req.head(), &res);
        assert!(matches!(render(":method [:date[bogus]]", &exchange, false), Err(Error::DateFormat(_))));
        assert!(matches!(log_line(":date", &exchange, false), Err(Error::DateFormat(_))));
    }

    #[test]
    fn preset_matches_its_template() {
        let req = Request::builder()
            .header("user-agent", "test")
            .remote_addr("127.0.0.1:9000".parse().unwrap())
            .build();
        let res = Response::text("ok");
        let exchange = Exchange::new(req.head(), &res);

        for preset in Preset::ALL {
            let by_name = Format::parse(preset.name()).render_at(&exchange, false, instant());
            let by_template = Format::parse(preset.template()).render_at(&exchange, preset.forces_debug(), instant());
            assert_eq!(by_name.unwrap(), by_template.unwrap(), "{preset}");
        }
    }

    #[test]
    fn combined_line() {
        let req = Request::builder()
            .uri(Uri::from_static("/index.html"))
            .header("referer", "https://example.com/")
            .header("user-agent", "Mozilla/5.0")
            .header("authorization", "Basic YWxpY2U6c2VjcmV0")
            .remote_addr("192.0.2.1:40000".parse().unwrap())
            .build();
        let res = Response::text("hello");
        let exchange = Exchange::new(req.head(), &res);

        let line = Format::parse("combined").render_at(&exchange, false, instant()).unwrap();
        assert_eq!(
            line,
            r#"192.0.2.1 - alice [29/Feb/2024:23:59:01 +00:00] "GET /index.html HTTP/1.1" 200 5 "https://example.com/" "Mozilla/5.0""#
        );
    }

    #[test]
    fn debug_preset_forces_decoration() {
        let req = Request::builder().build();
        let res = Response::status(StatusCode::OK);
        let exchange = Exchange::new(req.head(), &res);

        let format = Format::parse("debug");
        assert!(format.forces_debug());
        assert_eq!(format.preset(), Some(Preset::Debug));
        let line = format.render(&exchange, false).unwrap();
        assert!(line.contains('\u{1b}'));

        // The same template given literally is not forced.
        let literal = Format::parse(Preset::Debug.template());
        assert!(!literal.forces_debug());
        assert!(!literal.render(&exchange, false).unwrap().contains('\u{1b}'));
    }

    #[test]
    fn strict_parsing() {
        assert!(Format::parse_strict("combined").is_ok());
        assert!(Format::parse_strict(":date[iso] :response-time[2]").is_ok());
        assert!(matches!(
            Format::parse_strict(":method :bogus"),
            Err(Error::UnknownToken(token)) if token == ":bogus"
        ));
        assert!(matches!(
            Format::parse_strict(":date[unix]"),
            Err(Error::DateFormat(style)) if style == "unix"
        ));
        assert!(matches!(Format::parse_strict(":date"), Err(Error::DateFormat(_))));
    }

    #[test]
    fn invalid_tokens_lists_each_problem() {
        let format = Format::parse(":method :nope :date[rfc] :date[iso] :nope");
        let invalid: Vec<_> = format.invalid_tokens().map(|(token, err)| (token.text(), err.to_string())).collect();
        assert_eq!(invalid, [
            (":nope", "unknown format token `:nope`".to_owned()),
            (":date[rfc]", "unsupported date format `rfc`, use one of clf, iso, web".to_owned()),
        ]);
        assert_eq!(Format::parse("debug").invalid_tokens().count(), 0);
    }
}
