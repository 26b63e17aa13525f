//! Application: a middleware chain ending in one endpoint.
//!
//! No routing. Requests enter the first middleware registered with
//! [`App::wrap`] and travel inward until something answers them. If nothing
//! does, the answer is `404 Not Found`.

use std::sync::Arc;

use crate::error::{self, Error, ErrorHandler};
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Next, SharedMiddleware};
use crate::request::Request;
use crate::response::Response;

/// The application.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
///
/// ```rust
/// use reqlog::{App, middleware::logger};
///
/// async fn hello(_req: reqlog::Request) -> &'static str {
///     "Hello World"
/// }
///
/// let app = App::new()
///     .wrap(logger::logger(None))
///     .handler(hello);
/// ```
pub struct App {
    middleware: Vec<SharedMiddleware>,
    endpoint: Option<BoxedHandler>,
    on_error: ErrorHandler,
}

impl App {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
            endpoint: None,
            on_error: Arc::new(error::report),
        }
    }

    /// Appends a middleware. The first one registered sees requests first
    /// and responses last.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Sets the endpoint at the end of the chain, replacing any previous one.
    pub fn handler(mut self, handler: impl Handler) -> Self {
        self.endpoint = Some(handler.into_boxed_handler());
        self
    }

    /// Replaces the default error handler ([`error::report`]).
    ///
    /// It receives errors escaping the chain and errors raised by response
    /// streams after the chain returned.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(f);
        self
    }

    /// Runs `req` through the chain.
    pub async fn respond(&self, req: Request) -> Result<Response, Error> {
        Next::new(&self.middleware, self.endpoint.as_ref()).run(req).await
    }

    pub(crate) fn error_handler(&self) -> ErrorHandler {
        Arc::clone(&self.on_error)
    }

    /// Builds a [`Request`] bound to this app's error handler.
    pub fn request(&self, req: http::Request<bytes::Bytes>) -> Request {
        let (head, body) = req.into_parts();
        Request::new(head, body, self.error_handler())
    }
}

impl Default for App {
    fn default() -> Self { Self::new() }
}
