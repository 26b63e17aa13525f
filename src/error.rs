//! Unified error type.

use std::sync::Arc;

use http::StatusCode;

/// The error type returned by reqlog's fallible operations.
///
/// Handlers and middleware return `Err(Error)` to abort the chain. An error
/// built with [`Error::http`] carries the status the server should answer
/// with; every other variant maps to `500 Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("invalid log level `{0}`")]
    InvalidLevel(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// An error that answers the client with `status`.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    /// Wraps any other error. It will be reported as a 500.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }

    /// The status attached to this error, if it carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Callback that receives errors raised outside the normal return path,
/// such as a failing response stream.
pub type ErrorHandler = Arc<dyn Fn(&Error) + Send + Sync + 'static>;

/// The application's default error handler: log and move on.
///
/// Client errors are logged at `warn`, everything else at `error`.
pub fn report(err: &Error) {
    match err.status() {
        Some(status) if status.is_client_error() => {
            tracing::warn!(status = status.as_u16(), "{err}");
        }
        _ => tracing::error!("{err}"),
    }
}
