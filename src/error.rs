//! Unified error type.

/// The error type returned by organ's fallible operations.
///
/// Missing request or response data is never an error: the affected token
/// renders as `-` (or empty) instead. This type covers formats that cannot be
/// rendered at all and the I/O failures of the bundled server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `:date` token carried a style other than `clf`, `iso` or `web`.
    /// Holds the offending argument, empty when none was given.
    #[error("unsupported date format `{0}`, use one of clf, iso, web")]
    DateFormat(String),

    /// Strict mode only: a token name outside the known vocabulary.
    #[error("unknown format token `{0}`")]
    UnknownToken(String),

    /// Binding, accepting or serving a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
