//! # reqlog
//!
//! Request logging for a minimal hyper-based HTTP framework.
//!
//! Every request gets two lines: one when it arrives and one when its
//! response has actually left the server (or the client gave up on it),
//! with status, latency, and the number of bytes sent.
//!
//! ```text
//!   <-- GET /hello
//!   --> GET /hello 200 3ms 11b
//! ```
//!
//! The framework around the logger is deliberately small:
//!
//! - An [`App`] is a chain of [`Middleware`](middleware::Middleware) ending in
//!   one endpoint. No routing.
//! - Response bodies may be buffered or streamed; streamed bodies are counted
//!   on their way to the socket.
//! - Every [`Response`] exposes a one-shot [`completion`](Response::completion)
//!   signal that resolves when the body is fully written or abandoned.
//! - Graceful shutdown on SIGTERM / Ctrl-C, draining in-flight requests.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use reqlog::{App, Request, Server, middleware::logger::logger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reqlog::Error> {
//!     let app = App::new()
//!         .wrap(logger(None))
//!         .handler(hello);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn hello(_req: Request) -> &'static str {
//!     "Hello World"
//! }
//! ```

mod app;
mod body;
mod completion;
mod counter;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use app::App;
pub use body::{Body, BodyStream};
pub use completion::{Completed, Completion, Outgoing};
pub use counter::{Counter, Tally};
pub use error::{Error, ErrorHandler, report};
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use server::Server;
