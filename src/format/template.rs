//! Format string parsing and substitution.
//!
//! A format string is scanned once into a [`Template`]: an ordered list of
//! literal and token segments plus the list of *distinct* tokens. Rendering
//! resolves each distinct token exactly once and then walks the segments, so
//! a resolved value is never scanned again and `:response[content-length]`
//! cannot be confused with `:response-time`.
//!
//! Token grammar: `:` followed by lowercase letters and hyphens (longest
//! match), optionally followed by `[` letters, digits or hyphens `]`.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::error::Error;
use crate::exchange::Exchange;
use crate::format::resolve::Resolve;

// ── Field ─────────────────────────────────────────────────────────────────────

/// The closed token vocabulary.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Date,
    HttpVersion,
    Method,
    Referrer,
    RemoteAddr,
    RemoteUser,
    Request,
    Response,
    ResponseTime,
    Status,
    Url,
    UserAgent,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Self::Date,
        Self::HttpVersion,
        Self::Method,
        Self::Referrer,
        Self::RemoteAddr,
        Self::RemoteUser,
        Self::Request,
        Self::Response,
        Self::ResponseTime,
        Self::Status,
        Self::Url,
        Self::UserAgent,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Token name as written after the colon.
    pub fn name(self) -> &'static str {
        match self {
            Self::Date         => "date",
            Self::HttpVersion  => "http-version",
            Self::Method       => "method",
            Self::Referrer     => "referrer",
            Self::RemoteAddr   => "remote-addr",
            Self::RemoteUser   => "remote-user",
            Self::Request      => "request",
            Self::Response     => "response",
            Self::ResponseTime => "response-time",
            Self::Status       => "status",
            Self::Url          => "url",
            Self::UserAgent    => "user-agent",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

/// One distinct token occurrence, e.g. `:date[clf]`.
///
/// Two occurrences with the same text are the same token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    name: String,
    arg: Option<String>,
    field: Option<Field>,
}

impl Token {
    fn new(text: &str) -> Self {
        // `text` comes from the scanner, so it starts with ':' and a bracket
        // (if any) is closed by the last character.
        let body = &text[1..];
        let (name, arg) = match body.split_once('[') {
            Some((name, rest)) => (name, Some(rest.trim_end_matches(']'))),
            None => (body, None),
        };
        Self {
            text: text.to_owned(),
            name: name.to_owned(),
            arg: arg.map(str::to_owned),
            field: Field::from_name(name),
        }
    }

    /// Full occurrence text, colon and argument included.
    pub fn text(&self) -> &str { &self.text }

    /// Token name without the colon.
    pub fn name(&self) -> &str { &self.name }

    /// Bracketed argument, without the brackets.
    pub fn arg(&self) -> Option<&str> { self.arg.as_deref() }

    /// `None` for names outside the vocabulary.
    pub fn field(&self) -> Option<Field> { self.field }
}

// ── Template ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(Range<usize>),
    /// Index into `Template::tokens`.
    Token(usize),
}

/// A parsed format string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    tokens: Vec<Token>,
}

impl Template {
    /// Scans `source` for tokens. Never fails: anything that is not a token
    /// is literal text.
    pub fn parse(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut tokens: Vec<Token> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        let mut literal_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b':' {
                i += 1;
                continue;
            }
            let end = token_end(bytes, i);
            if end == i + 1 {
                // A colon without a name, e.g. "METHOD: ".
                i += 1;
                continue;
            }

            if literal_start < i {
                segments.push(Segment::Literal(literal_start..i));
            }
            let text = &source[i..end];
            let index = *seen.entry(text).or_insert_with(|| {
                tokens.push(Token::new(text));
                tokens.len() - 1
            });
            segments.push(Segment::Token(index));

            literal_start = end;
            i = end;
        }
        if literal_start < bytes.len() {
            segments.push(Segment::Literal(literal_start..bytes.len()));
        }

        Self { source: source.to_owned(), segments, tokens }
    }

    /// The format string this template was parsed from.
    pub fn source(&self) -> &str { &self.source }

    /// Distinct tokens in order of first appearance.
    pub fn tokens(&self) -> &[Token] { &self.tokens }

    /// Tokens whose name is outside the vocabulary.
    pub fn unknown_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| token.field.is_none())
    }

    /// Resolves every distinct token once through `resolver` and substitutes
    /// the values. Tokens the resolver does not recognise keep their raw text.
    /// The first resolver error aborts the render.
    pub fn render_with<R>(&self, resolver: &R, exchange: &Exchange<'_>) -> Result<String, Error>
    where
        R: Resolve + ?Sized,
    {
        let values = self.tokens.iter()
            .map(|token| resolver.resolve(token, exchange))
            .collect::<Result<Vec<_>, _>>()?;

        let mut line = String::with_capacity(self.source.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(range) => line.push_str(&self.source[range.clone()]),
                Segment::Token(index) => match &values[*index] {
                    Some(value) => line.push_str(value),
                    None => line.push_str(&self.tokens[*index].text),
                },
            }
        }
        Ok(line)
    }
}

/// End of the token starting at `start` (which holds a ':').
///
/// Returns `start + 1` when no name follows. An opening bracket that is not
/// properly closed is left out of the token.
fn token_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start + 1;
    while end < bytes.len() && (bytes[end].is_ascii_lowercase() || bytes[end] == b'-') {
        end += 1;
    }
    if end == start + 1 || bytes.get(end) != Some(&b'[') {
        return end;
    }

    let mut close = end + 1;
    while close < bytes.len() && (bytes[close].is_ascii_alphanumeric() || bytes[close] == b'-') {
        close += 1;
    }
    if bytes.get(close) == Some(&b']') { close + 1 } else { end }
}
