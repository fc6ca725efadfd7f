//! # organ
//!
//! Access logging for HTTP services, in the style of the classic
//! `:method :url :status` format strings.
//!
//! A format string mixes literal text with tokens such as `:remote-addr`,
//! `:date[clf]` or `:response[content-length]`. The [`Logger`] middleware
//! wraps a handler, times it, stamps an `X-Response-Time` header on the
//! response and renders one line per request:
//!
//! ```text
//! 127.0.0.1 - - [10/Oct/2000:13:55:36 +00:00] "GET /index.html HTTP/1.1" 200 2326 "-" "curl/8.5.0"
//! ```
//!
//! Six presets cover the usual cases: `combined` (the default), `common`,
//! `dev`, `short`, `tiny` and the multi-line, colourised `debug`. See the
//! [`format`] module for the token reference.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use organ::{Logger, LoggerConf, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), organ::Error> {
//!     let app = Logger::new(LoggerConf::with_format("tiny"))?.wrap(hello);
//!     Server::bind(([0, 0, 0, 0], 3000).into()).serve(app).await
//! }
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//! ```
//!
//! ## Rendering without the middleware
//!
//! [`render`] and [`log_line`] work on any [`Exchange`], a borrowed view of a
//! finished request and its response:
//!
//! ```rust
//! use http::StatusCode;
//! use organ::{render, Exchange, Request, Response};
//!
//! let req = Request::builder().build();
//! let res = Response::status(StatusCode::NO_CONTENT);
//! let line = render(":method :url :status", &Exchange::new(req.head(), &res), false)?;
//! assert_eq!(line, "GET / 204");
//! # Ok::<(), organ::Error>(())
//! ```

mod auth;
mod config;
mod error;
mod exchange;
mod handler;
mod request;
mod response;
mod server;
mod sink;

pub mod format;
pub mod middleware;

pub use auth::basic_user;
pub use config::{LoggerConf, SinkKind};
pub use error::Error;
pub use exchange::Exchange;
pub use format::{log_line, render, Format, Preset};
pub use handler::Handler;
pub use middleware::Logger;
pub use request::{Request, RequestBuilder, RequestHead};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
pub use sink::{Sink, Stdout, Tracing};
