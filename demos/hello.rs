//! Minimal reqlog example: console logging plus a second logger that
//! forwards to `tracing`.
//!
//! Run with:
//!   RUST_LOG=debug PORT=3000 cargo run --example hello
//!
//! Try:
//!   curl http://localhost:3000/hello
//!   curl http://localhost:3000/stream
//!   curl http://localhost:3000/boom

use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use http::StatusCode;
use reqlog::middleware::logger::{LoggerConfig, TracingWriter, logger};
use reqlog::{App, ContentType, Error, Request, Response, Server};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let app = App::new()
        .wrap(logger(None))
        .wrap(logger(Some(LoggerConfig::new().sink(TracingWriter, Level::DEBUG))))
        .handler(route);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_owned());
    println!("listening on port {port}");

    Server::bind(&format!("0.0.0.0:{port}"))?.serve(app).await
}

// No router: one endpoint looks at the path itself.
async fn route(req: Request) -> Result<Response, Error> {
    match req.uri().path() {
        "/stream" => Ok(ticks()),
        "/boom" => Err(Error::http(StatusCode::IM_A_TEAPOT, "no coffee here")),
        _ => Ok(Response::text("Hello World")),
    }
}

// Five lines, 200 ms apart, with no content-length: the logger counts them.
fn ticks() -> Response {
    let chunks = stream::iter(1..=5).then(|n| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(Bytes::from(format!("tick {n}\n")))
    });
    Response::builder().stream(ContentType::Text, chunks)
}
