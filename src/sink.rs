//! Destinations for rendered access-log lines.

use std::io::{self, Write};

use tracing::{error, info};

/// Receives one rendered line per request.
///
/// Lines may span several lines of text (the `debug` preset does). A sink
/// must not fail the request: write errors are its own business.
pub trait Sink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes each line to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Sink for Stdout {
    fn write_line(&self, line: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            error!("failed writing access log line: {e}");
        }
    }
}

/// Emits each line as an `info` event with target `access_log`, so the
/// application's `tracing` subscriber decides where it ends up.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tracing;

impl Sink for Tracing {
    fn write_line(&self, line: &str) {
        info!(target: "access_log", "{line}");
    }
}

/// Any `Fn(&str)` is a sink, e.g. a closure pushing into a shared buffer.
impl<F> Sink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write_line(&self, line: &str) {
        self(line)
    }
}
