//! Logger configuration.
//!
//! [`LoggerConf`] deserializes from any serde format, every field optional:
//!
//! ```yaml
//! format: ":method :url :status :response-time[1] ms"
//! debug: false
//! strict: true
//! sink: tracing
//! ```

use serde::Deserialize;

/// Where rendered lines go.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Standard output, one `writeln!` per request.
    #[default]
    Stdout,
    /// `tracing` events with target `access_log`.
    Tracing,
}

/// Configuration of the [`Logger`](crate::middleware::Logger) middleware.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConf {
    /// A format template or preset name. Defaults to `combined`.
    pub format: String,
    /// Decorate method, URL, status, referrer and response time with ANSI
    /// styles. The `debug` preset turns this on by itself.
    pub debug: bool,
    /// Reject unknown tokens and invalid `:date` styles when the logger is
    /// built instead of passing them through.
    pub strict: bool,
    pub sink: SinkKind,
}

impl Default for LoggerConf {
    fn default() -> Self {
        Self {
            format: "combined".to_owned(),
            debug: false,
            strict: false,
            sink: SinkKind::Stdout,
        }
    }
}

impl LoggerConf {
    /// Default configuration with a different format.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self { format: format.into(), ..Self::default() }
    }
}
