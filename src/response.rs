//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Middleware further up
//! the chain may inspect it, swap its body, or subscribe to its completion
//! before it reaches the transport.

use bytes::Bytes;
use futures_util::Stream;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::body::Body;
use crate::completion::{Completed, Notifier, Outgoing};
use crate::error::Error;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    EventStream,  // text/event-stream  (SSE)
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::EventStream => "text/event-stream",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// A default response is `404 Not Found` with no body: that is what a
/// request gets when nothing in the chain answers it.
///
/// ```rust
/// use futures_util::stream;
/// use reqlog::{ContentType, Response};
/// use http::StatusCode;
///
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .bytes(ContentType::Json, br#"{"id":42}"#.to_vec());
///
/// let chunks = stream::iter(vec![Ok(bytes::Bytes::from_static(b"tick\n"))]);
/// Response::builder().stream(ContentType::EventStream, chunks);
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
    notifier: Notifier,
}

impl Default for Response {
    fn default() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }
}

impl Response {
    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self {
            status: code,
            headers: HeaderMap::new(),
            body: Body::Empty,
            notifier: Notifier::default(),
        }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    /// The response an error escaping the whole chain turns into.
    ///
    /// Client errors expose their message; anything else answers with the
    /// status's reason phrase only.
    pub fn from_error(err: &Error) -> Self {
        let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status.is_client_error() {
            match err {
                Error::Http { message, .. } => message.clone(),
                other => other.to_string(),
            }
        } else {
            status.canonical_reason().unwrap_or_default().to_owned()
        };
        Self::builder().status(status).text(message)
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    /// The response length as far as it is known before sending.
    ///
    /// An explicit `content-length` header wins; otherwise a buffered body
    /// reports its size. Streams and missing bodies have no length.
    pub fn length(&self) -> Option<u64> {
        if let Some(value) = self.headers.get(CONTENT_LENGTH) {
            return value.to_str().ok().and_then(|v| v.trim().parse().ok());
        }
        match self.body {
            Body::Empty => None,
            _ => self.body.known_len(),
        }
    }

    /// Subscribes to the moment this response finishes or is abandoned.
    ///
    /// Every subscriber sees the same single event. Dropping the response
    /// without sending it resolves as [`Completion::Close`](crate::Completion::Close).
    pub fn completion(&mut self) -> Completed {
        self.notifier.subscribe()
    }

    /// Converts into the `http::Response` hyper writes to the wire.
    pub fn into_inner(self) -> http::Response<Outgoing> {
        let mut res = http::Response::new(Outgoing::new(self.body, self.notifier));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method, so you always know what you're sending.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Adds a header. Names or values that are not valid HTTP are dropped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
        self
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Body::full(body.into()))
    }

    /// Terminate with a typed, fully buffered body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, Body::full(body))
    }

    /// Terminate with a streamed body. Its length is unknown until sent.
    pub fn stream<S>(self, content_type: ContentType, stream: S) -> Response
    where
        S: Stream<Item = Result<Bytes, Error>> + Send + 'static,
    {
        self.finish(content_type, Body::stream(stream))
    }

    fn finish(mut self, content_type: ContentType, body: Body) -> Response {
        self.headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type.as_str()));
        Response {
            status: self.status,
            headers: self.headers,
            body,
            notifier: Notifier::default(),
        }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into the outcome of a handler.
///
/// Implemented for [`Response`], strings, bare status codes, and any
/// `Result<T, Error>` whose `T` converts, so handlers may use `?`.
///
/// ```rust
/// use reqlog::{Error, Request};
/// use http::StatusCode;
///
/// async fn find_user(req: Request) -> Result<String, Error> {
///     match req.header("x-user") {
///         Some(name) => Ok(format!("hello {name}")),
///         None => Err(Error::http(StatusCode::UNAUTHORIZED, "who are you?")),
///     }
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Result<Response, Error>;
}

impl IntoResponse for Response {
    fn into_response(self) -> Result<Response, Error> { Ok(self) }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Result<Response, Error> { Ok(Response::text(self)) }
}

impl IntoResponse for String {
    fn into_response(self) -> Result<Response, Error> { Ok(Response::text(self)) }
}

/// Return a status directly from a handler: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Result<Response, Error> { Ok(Response::status(self)) }
}

impl<T: IntoResponse> IntoResponse for Result<T, Error> {
    fn into_response(self) -> Result<Response, Error> {
        self.and_then(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;

    #[test]
    fn buffered_bodies_report_their_length() {
        assert_eq!(Response::text("Hello World").length(), Some(11));
    }

    #[test]
    fn explicit_content_length_wins() {
        let res = Response::builder().header("content-length", "42").text("short");
        assert_eq!(res.length(), Some(42));
    }

    #[test]
    fn streams_and_empty_bodies_have_no_length() {
        let chunks = stream::iter(vec![Ok(Bytes::from_static(b"abc"))]);
        let res = Response::builder().stream(ContentType::OctetStream, chunks);
        assert_eq!(res.length(), None);
        assert_eq!(Response::default().length(), None);
    }

    #[test]
    fn unset_status_is_not_found() {
        assert_eq!(Response::default().status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_hide_their_message() {
        let res = Response::from_error(&Error::other("db password is hunter2"));
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.length(), Some("Internal Server Error".len() as u64));

        let res = Response::from_error(&Error::http(StatusCode::BAD_REQUEST, "bad id"));
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.length(), Some(6));
    }
}
