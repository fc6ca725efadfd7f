//! Minimal organ example: two endpoints behind the access logger.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!   cargo run --example basic -- debug
//!
//! The optional argument is the log format: a preset name (`combined`,
//! `common`, `dev`, `short`, `tiny`, `debug`) or a template such as
//! `':method :url :status :response-time[1] ms'`.
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -u alice:secret -X POST http://localhost:3000/users

use http::{Method, StatusCode};
use organ::{Logger, LoggerConf, Request, Response, Server};

#[tokio::main]
async fn main() -> Result<(), organ::Error> {
    tracing_subscriber::fmt::init();

    let format = std::env::args().nth(1).unwrap_or_else(|| "dev".to_owned());
    let app = Logger::new(LoggerConf::with_format(format))?.wrap(users);

    Server::bind(([0, 0, 0, 0], 3000).into()).serve(app).await
}

async fn users(req: Request) -> Response {
    let path = req.uri().path();
    if req.method() == Method::GET {
        if let Some(id) = path.strip_prefix("/users/") {
            return Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes());
        }
    }
    if req.method() == Method::POST && path == "/users" {
        return Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/99")
            .json(br#"{"id":"99"}"#.to_vec());
    }
    Response::status(StatusCode::NOT_FOUND)
}
