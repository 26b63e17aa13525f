//! Incoming HTTP request type.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::error::{self, ErrorHandler};

/// An incoming HTTP request with its body already read.
pub struct Request {
    pub(crate) head: http::request::Parts,
    pub(crate) body: Bytes,
    pub(crate) on_error: ErrorHandler,
}

impl Request {
    pub(crate) fn new(head: http::request::Parts, body: Bytes, on_error: ErrorHandler) -> Self {
        Self { head, body, on_error }
    }

    /// Builds a request outside a running server, e.g. to drive an
    /// [`App`](crate::App) from a test.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (head, body) = req.into_parts();
        Self::new(head, body, Arc::new(error::report))
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Path plus query string, exactly as the client sent it.
    pub fn original_url(&self) -> &str {
        self.head.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }

    /// Case-insensitive header lookup. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The application's error handler for failures that happen after the
    /// chain has returned, such as a response stream breaking mid-flight.
    pub fn error_handler(&self) -> ErrorHandler {
        Arc::clone(&self.on_error)
    }
}
