//! Response bodies.
//!
//! A body is either nothing, one buffer known up front, or a stream of
//! chunks whose total size is only known once the last chunk has gone out.
//! Only the streaming kind needs to be counted on its way to the socket.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use http_body::{Frame, SizeHint};

use crate::counter::{Counter, Tally};
use crate::error::{Error, ErrorHandler};

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send + 'static>>;

/// An outgoing response body.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    Full(Option<Bytes>),
    Stream { stream: BodyStream, done: bool },
}

impl Body {
    pub fn full(bytes: impl Into<Bytes>) -> Self {
        Self::Full(Some(bytes.into()))
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, Error>> + Send + 'static,
    {
        Self::Stream { stream: Box::pin(stream), done: false }
    }

    /// Byte length, when it is known without consuming the body.
    pub fn known_len(&self) -> Option<u64> {
        match self {
            Self::Empty => Some(0),
            Self::Full(bytes) => Some(bytes.as_ref().map_or(0, |b| b.len() as u64)),
            Self::Stream { .. } => None,
        }
    }

    /// Re-routes a streaming body through a [`Counter`] and returns its tally.
    ///
    /// Returns `None`, leaving the body untouched, if it is not a stream.
    pub fn count(&mut self, on_error: ErrorHandler) -> Option<Tally> {
        match std::mem::take(self) {
            Self::Stream { stream, done } => {
                let tally = Tally::default();
                *self = Self::Stream {
                    stream: Box::pin(Counter::new(stream, tally.clone(), on_error)),
                    done,
                };
                Some(tally)
            }
            other => {
                *self = other;
                None
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Body::Empty"),
            Self::Full(bytes) => f.debug_tuple("Body::Full").field(bytes).finish(),
            Self::Stream { done, .. } => f.debug_struct("Body::Stream").field("done", done).finish(),
        }
    }
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Error>>> {
        // Every variant is Unpin: the stream is already boxed.
        match self.get_mut() {
            Self::Empty => Poll::Ready(None),
            Self::Full(bytes) => Poll::Ready(bytes.take().map(|b| Ok(Frame::data(b)))),
            Self::Stream { stream, done } => {
                if *done {
                    return Poll::Ready(None);
                }
                match stream.as_mut().poll_next(cx) {
                    Poll::Ready(Some(item)) => Poll::Ready(Some(item.map(Frame::data))),
                    Poll::Ready(None) => {
                        *done = true;
                        Poll::Ready(None)
                    }
                    Poll::Pending => Poll::Pending,
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Full(bytes) => bytes.as_ref().is_none_or(Bytes::is_empty),
            Self::Stream { done, .. } => *done,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self.known_len() {
            Some(len) => SizeHint::with_exact(len),
            None => SizeHint::default(),
        }
    }
}
