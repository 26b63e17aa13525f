//! Where log lines go.
//!
//! Either the built-in console printer or a caller-supplied [`LogWriter`].
//! The choice is made once, when the logger is built.

use std::sync::Arc;

use console::style;
use http::Method;
use tracing::Level;

use super::record::{LogRecord, Outcome, status_color};

/// Anything that accepts a message at a severity level.
///
/// Closures work out of the box:
///
/// ```rust
/// use reqlog::middleware::logger::LoggerConfig;
/// use tracing::Level;
///
/// let config = LoggerConfig::new().sink(|level: Level, msg: &str| eprintln!("[{level}] {msg}"), Level::DEBUG);
/// ```
pub trait LogWriter: Send + Sync + 'static {
    fn write(&self, level: Level, message: &str);

    /// Receives the finished summary. Defaults to writing its one-line form;
    /// structured backends can override this to keep the fields apart.
    fn record(&self, level: Level, record: &LogRecord) {
        self.write(level, &record.to_string());
    }
}

impl<F> LogWriter for F
where
    F: Fn(Level, &str) + Send + Sync + 'static,
{
    fn write(&self, level: Level, message: &str) {
        self(level, message)
    }
}

/// Forwards messages to the `tracing` subscriber under the `reqlog` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingWriter;

// tracing needs the level at compile time.
macro_rules! event_at {
    ($level:expr, $($args:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!(target: "reqlog", $($args)+),
            Level::WARN => tracing::warn!(target: "reqlog", $($args)+),
            Level::INFO => tracing::info!(target: "reqlog", $($args)+),
            Level::DEBUG => tracing::debug!(target: "reqlog", $($args)+),
            _ => tracing::trace!(target: "reqlog", $($args)+),
        }
    };
}

impl LogWriter for TracingWriter {
    fn write(&self, level: Level, message: &str) {
        event_at!(level, "{message}");
    }

    fn record(&self, level: Level, record: &LogRecord) {
        event_at!(
            level,
            method = %record.method,
            url = %record.url,
            status = record.status.as_u16(),
            elapsed_ms = record.elapsed.as_millis() as u64,
            length = record.length,
            outcome = ?record.outcome,
            "{record}"
        );
    }
}

/// Colorized two-line output on stdout.
///
/// ```text
///   <-- GET /hello
///   --> GET /hello 200 3ms 11b
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ConsoleSink {
    colors: bool,
}

impl ConsoleSink {
    /// Colors on if stdout is a terminal that supports them.
    pub fn new() -> Self {
        Self { colors: console::colors_enabled() }
    }

    /// Never emits escape codes.
    pub fn plain() -> Self {
        Self { colors: false }
    }

    pub fn begin_line(&self, method: &Method, url: &str) -> String {
        format!(
            "  {} {} {}",
            self.gray("<--"),
            style(method).bold().force_styling(self.colors),
            self.gray(url),
        )
    }

    pub fn end_line(&self, record: &LogRecord) -> String {
        let marker = style(record.outcome.marker()).force_styling(self.colors);
        let marker = match record.outcome {
            Outcome::Normal => marker.black().bright(),
            Outcome::Error => marker.red(),
            Outcome::ClientClosed => marker.yellow(),
        };
        let mut status = style(record.status.as_u16()).force_styling(self.colors);
        if let Some(color) = status_color(record.status) {
            status = status.fg(color);
        }
        format!(
            "  {} {} {} {} {} {}",
            marker,
            style(&record.method).bold().force_styling(self.colors),
            self.gray(&record.url),
            status,
            self.gray(record.time()),
            self.gray(record.length_display()),
        )
    }

    fn gray<D>(&self, text: D) -> console::StyledObject<D> {
        style(text).black().bright().force_styling(self.colors)
    }
}

impl Default for ConsoleSink {
    fn default() -> Self { Self::new() }
}

/// The destination a logger was configured with.
#[derive(Clone)]
pub(crate) enum Sink {
    Console(ConsoleSink),
    Writer { writer: Arc<dyn LogWriter>, level: Level },
}

impl Sink {
    pub(crate) fn begin(&self, method: &Method, url: &str) {
        match self {
            Self::Console(printer) => println!("{}", printer.begin_line(method, url)),
            Self::Writer { writer, level } => writer.write(*level, &format!("{method} {url}")),
        }
    }

    pub(crate) fn end(&self, record: &LogRecord) {
        match self {
            Self::Console(printer) => println!("{}", printer.end_line(record)),
            Self::Writer { writer, level } => writer.record(*level, record),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use http::StatusCode;

    use super::*;

    fn record(status: u16, outcome: Outcome) -> LogRecord {
        LogRecord {
            method: Method::POST,
            url: "/users?active=1".to_owned(),
            status: StatusCode::from_u16(status).unwrap(),
            elapsed: Duration::from_millis(42),
            length: Some(2048),
            outcome,
        }
    }

    #[test]
    fn plain_console_lines() {
        let printer = ConsoleSink::plain();
        assert_eq!(printer.begin_line(&Method::GET, "/hello"), "  <-- GET /hello");
        assert_eq!(
            printer.end_line(&record(201, Outcome::Normal)),
            "  --> POST /users?active=1 201 42ms 2kb",
        );
        assert_eq!(
            printer.end_line(&record(500, Outcome::Error)),
            "  xxx POST /users?active=1 500 42ms 2kb",
        );
        assert_eq!(
            printer.end_line(&record(304, Outcome::ClientClosed)),
            "  -x- POST /users?active=1 304 42ms ",
        );
    }

    #[test]
    fn colored_console_lines_carry_escape_codes() {
        let printer = ConsoleSink { colors: true };
        let line = printer.end_line(&record(503, Outcome::Error));
        assert!(line.contains("\u{1b}["));
        assert!(console::strip_ansi_codes(&line).ends_with("xxx POST /users?active=1 503 42ms 2kb"));
    }

    #[test]
    fn writer_sink_gets_single_line_messages_at_its_level() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let out = Arc::clone(&seen);
        let sink = Sink::Writer {
            writer: Arc::new(move |level: Level, msg: &str| {
                out.lock().unwrap().push((level, msg.to_owned()));
            }),
            level: Level::DEBUG,
        };

        sink.begin(&Method::POST, "/users?active=1");
        sink.end(&record(201, Outcome::Normal));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (Level::DEBUG, "POST /users?active=1".to_owned()),
                (Level::DEBUG, "POST /users?active=1 201 42ms 2kb".to_owned()),
            ],
        );
    }
}
