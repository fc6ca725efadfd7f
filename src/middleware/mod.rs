//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) and is itself a handler, so
//! layers nest freely:
//!
//! ```rust,no_run
//! use organ::middleware::Logger;
//! use organ::{LoggerConf, Request, Response, Server};
//!
//! # async fn run() -> Result<(), organ::Error> {
//! let app = Logger::new(LoggerConf::with_format("dev"))?.wrap(hello);
//! Server::bind(([127, 0, 0, 1], 3000).into()).serve(app).await
//! # }
//! async fn hello(_req: Request) -> Response { Response::text("hello") }
//! ```

mod logger;

pub use logger::{Logged, Logger, X_RESPONSE_TIME};
