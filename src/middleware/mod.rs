//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request logging, metrics, request-id injection.
//!
//! Each middleware receives the request and a [`Next`] handle. Calling
//! [`Next::run`] hands the request to the rest of the chain and resolves with
//! whatever the chain produced; not calling it short-circuits the request.
//!
//! Built-in middleware:
//! - [`logger`]: one summary line per request with method, URL, status,
//!   latency, and response size

use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

pub mod logger;

/// A unit in the request-handling chain.
///
/// ```rust
/// use reqlog::middleware::{Middleware, Next};
/// use reqlog::{BoxFuture, Error, Request, Response};
///
/// struct PoweredBy;
///
/// impl Middleware for PoweredBy {
///     fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
///         Box::pin(async move {
///             let mut res = next.run(req).await?;
///             res.headers_mut().insert("x-powered-by", "reqlog".parse().unwrap());
///             Ok(res)
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>>;
}

pub(crate) type SharedMiddleware = Arc<dyn Middleware>;

/// The remainder of the chain after the current middleware.
pub struct Next<'a> {
    chain: &'a [SharedMiddleware],
    endpoint: Option<&'a BoxedHandler>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [SharedMiddleware], endpoint: Option<&'a BoxedHandler>) -> Self {
        Self { chain, endpoint }
    }

    /// Runs the rest of the chain.
    ///
    /// With no endpoint registered the chain answers with the default
    /// response, `404 Not Found`.
    pub async fn run(mut self, req: Request) -> Result<Response, Error> {
        if let Some((current, rest)) = self.chain.split_first() {
            self.chain = rest;
            return current.handle(req, self).await;
        }
        match self.endpoint {
            Some(handler) => handler.call(req).await,
            None => Ok(Response::default()),
        }
    }
}
