//! Terminal decoration for debug output.
//!
//! Styling is forced on: whether a line is decorated depends only on the
//! debug flag passed to the resolver, never on the terminal or environment.

use crate::format::template::Field;

/// One ANSI decoration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Style {
    Bold,
    Italic,
    Magenta,
    Gray,
    Green,
    Cyan,
    Yellow,
    Red,
}

impl Style {
    /// The decoration `field` gets in debug mode, given its resolved value.
    pub fn for_field(field: Field, value: &str) -> Option<Self> {
        match field {
            Field::Method       => Some(Self::Bold),
            Field::Referrer     => Some(Self::Italic),
            Field::ResponseTime => Some(Self::Magenta),
            Field::Url          => Some(Self::Gray),
            Field::Status       => match value.as_bytes().first() {
                Some(b'2') => Some(Self::Green),
                Some(b'3') => Some(Self::Cyan),
                Some(b'4') => Some(Self::Yellow),
                Some(b'5') => Some(Self::Red),
                _ => None,
            },
            Field::Date
            | Field::HttpVersion
            | Field::RemoteAddr
            | Field::RemoteUser
            | Field::Request
            | Field::Response
            | Field::UserAgent => None,
        }
    }

    /// Wraps `value` in this decoration's escape sequences.
    pub fn paint(self, value: &str) -> String {
        let style = console::Style::new().force_styling(true);
        let style = match self {
            Self::Bold    => style.bold(),
            Self::Italic  => style.italic(),
            Self::Magenta => style.magenta(),
            Self::Gray    => style.black().bright(),
            Self::Green   => style.green(),
            Self::Cyan    => style.cyan(),
            Self::Yellow  => style.yellow(),
            Self::Red     => style.red(),
        };
        style.apply_to(value).to_string()
    }
}
