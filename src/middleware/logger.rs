//! Access logging: one rendered line per request.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::header::{HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use crate::config::{LoggerConf, SinkKind};
use crate::error::Error;
use crate::exchange::Exchange;
use crate::format::Format;
use crate::handler::{private, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::sink::{Sink, Stdout, Tracing};

/// Response header carrying the handler's run time in milliseconds. The
/// `:response-time` token reads it.
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");

/// The access-log middleware.
///
/// The format is parsed once, here; every request only renders it.
pub struct Logger {
    format: Format,
    debug: bool,
    sink: Arc<dyn Sink>,
}

impl Logger {
    /// Builds a logger from configuration.
    ///
    /// Only fails in strict mode, for unknown tokens or `:date` styles.
    pub fn new(conf: LoggerConf) -> Result<Self, Error> {
        let format = if conf.strict {
            Format::parse_strict(&conf.format)?
        } else {
            Format::parse(&conf.format)
        };
        for (token, err) in format.invalid_tokens() {
            match err {
                Error::UnknownToken(_) => {
                    warn!(token = token.text(), "unknown access log token, it will be logged verbatim");
                }
                err => warn!(token = token.text(), "{err}, every access log line will be dropped"),
            }
        }
        debug!(
            format = %conf.format,
            tokens = format.template().tokens().len(),
            debug = conf.debug || format.forces_debug(),
            "access log format ready"
        );

        let sink: Arc<dyn Sink> = match conf.sink {
            SinkKind::Stdout => Arc::new(Stdout),
            SinkKind::Tracing => Arc::new(Tracing),
        };
        Ok(Self { format, debug: conf.debug, sink })
    }

    /// Replaces the configured sink.
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn format(&self) -> &Format { &self.format }

    /// Wraps `next`: times it, stamps `X-Response-Time` on its response and
    /// logs the exchange.
    pub fn wrap(self, next: impl Handler) -> Logged {
        Logged { logger: Arc::new(self), next: next.into_boxed_handler() }
    }

    /// Renders `exchange` and hands the line to the sink.
    pub fn log(&self, exchange: &Exchange<'_>) -> Result<(), Error> {
        let line = self.format.render(exchange, self.debug)?;
        self.sink.write_line(&line);
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("format", &self.format.template().source())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

// ── Logged ────────────────────────────────────────────────────────────────────

/// A handler wrapped by [`Logger::wrap`].
pub struct Logged {
    logger: Arc<Logger>,
    next: BoxedHandler,
}

impl Logged {
    /// Runs one request through the wrapped handler, for hosts other than
    /// [`Server`](crate::Server).
    pub async fn handle(&self, req: Request) -> Response {
        self.call(req).await
    }
}

impl private::Sealed for Logged {}

impl Handler for Logged {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl ErasedHandler for Logged {
    fn call(&self, req: Request) -> BoxFuture {
        let logger = Arc::clone(&self.logger);
        let next = Arc::clone(&self.next);

        Box::pin(async move {
            // The handler consumes the request; keep the head for the log line.
            let head = req.head().clone();
            let start = Instant::now();
            let mut res = next.call(req).await;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            if let Ok(value) = HeaderValue::try_from(elapsed_ms.to_string()) {
                res.set_header(X_RESPONSE_TIME, value);
            }

            // A broken format costs the log line, never the response.
            if let Err(e) = logger.log(&Exchange::new(&head, &res)) {
                error!(method = %head.method(), uri = %head.uri(), "failed rendering access log line: {e}");
            }
            res
        })
    }
}
