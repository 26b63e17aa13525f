//! Request logger.
//!
//! Prints a line when a request comes in and another once its response has
//! been written, or abandoned by the client:
//!
//! ```text
//!   <-- GET /hello
//!   --> GET /hello 200 3ms 11b
//! ```
//!
//! The second line is written exactly once per request. A handler error
//! produces an `xxx` line and the error continues up the chain untouched; a
//! client hanging up mid-response produces a `-x-` line instead of `-->`.
//!
//! Streamed bodies have no length until they are done, so when a response
//! carries no `content-length` the logger counts the bytes on their way out.
//!
//! To send lines somewhere other than stdout, give the logger a
//! [`LogWriter`] and a level:
//!
//! ```rust
//! use reqlog::App;
//! use reqlog::middleware::logger::{LoggerConfig, TracingWriter, logger};
//! use tracing::Level;
//!
//! let app = App::new().wrap(logger(Some(LoggerConfig::new().sink(TracingWriter, Level::DEBUG))));
//! ```

mod record;
mod sink;

use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;
use tracing::Level;

use crate::completion::Completion;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

pub use record::{LogRecord, Outcome, format_elapsed, format_length, humanize_bytes, status_color};
pub use sink::{ConsoleSink, LogWriter, TracingWriter};
use sink::Sink;

/// How a [`RequestLogger`] is set up. Built once, shared by every request.
///
/// The default sends colorized lines to stdout.
#[derive(Clone, Default)]
pub struct LoggerConfig {
    sink: Option<(Arc<dyn LogWriter>, Level)>,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends every line to `writer` at `level` instead of stdout.
    pub fn sink(mut self, writer: impl LogWriter, level: Level) -> Self {
        self.sink = Some((Arc::new(writer), level));
        self
    }

    /// Like [`sink`](Self::sink), with the level given by name
    /// (`"debug"`, `"INFO"`, …).
    ///
    /// An empty or unknown name is an error rather than a silent fallback
    /// to stdout.
    pub fn sink_named(self, writer: impl LogWriter, level: &str) -> Result<Self, Error> {
        let parsed = level
            .parse::<Level>()
            .map_err(|_| Error::InvalidLevel(level.to_owned()))?;
        Ok(self.sink(writer, parsed))
    }
}

/// Builds the request-logging middleware. `None` logs to stdout.
pub fn logger(config: Option<LoggerConfig>) -> RequestLogger {
    RequestLogger::with_config(config.unwrap_or_default())
}

/// Middleware that logs one summary line per request.
///
/// The status logged is the one the response had when the inner chain
/// returned it. Middleware registered outside the logger that rewrites the
/// status afterwards is not reflected.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<Sink>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    pub fn with_config(config: LoggerConfig) -> Self {
        let sink = match config.sink {
            Some((writer, level)) => Sink::Writer { writer, level },
            None => Sink::Console(ConsoleSink::new()),
        };
        Self { sink: Arc::new(sink) }
    }

    async fn log<'a>(&'a self, req: Request, next: Next<'a>) -> Result<Response, Error> {
        let start = Instant::now();
        let method = req.method().clone();
        let url = req.original_url().to_owned();
        let on_error = req.error_handler();

        self.sink.begin(&method, &url);

        let mut res = match next.run(req).await {
            Ok(res) => res,
            Err(err) => {
                self.sink.end(&LogRecord {
                    method,
                    url,
                    status: err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    elapsed: start.elapsed(),
                    length: None,
                    outcome: Outcome::Error,
                });
                return Err(err);
            }
        };

        let hint = res.length();
        let tally = match hint {
            Some(_) => None,
            None => res.body_mut().count(on_error),
        };
        let status = res.status_code();
        let done = res.completion();
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let outcome = match done.await {
                Completion::Finish => Outcome::Normal,
                Completion::Close => Outcome::ClientClosed,
            };
            sink.end(&LogRecord {
                method,
                url,
                status,
                elapsed: start.elapsed(),
                length: tally.map_or(hint, |t| Some(t.get())),
                outcome,
            });
        });

        Ok(res)
    }
}

impl Default for RequestLogger {
    fn default() -> Self { Self::new() }
}

impl Middleware for RequestLogger {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
        Box::pin(self.log(req, next))
    }
}
