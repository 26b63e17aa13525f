//! Response completion signal.
//!
//! A response ends in exactly one of two ways: the transport writes the last
//! frame (`Finish`), or the body is dropped before that, which is what happens
//! when the client hangs up (`Close`). Both arrive through one-shot channels
//! that the transport body drains on the first event, so whichever comes
//! first is the only one anybody observes.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as _, Frame, SizeHint};
use tokio::sync::oneshot;

use crate::body::Body;
use crate::error::Error;

/// How a response left the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Completion {
    /// The last byte was handed to the transport.
    Finish,
    /// The response was abandoned before it was fully written.
    Close,
}

/// Resolves once with the response's [`Completion`].
///
/// Obtained from [`Response::completion`](crate::Response::completion).
#[derive(Debug)]
pub struct Completed {
    rx: oneshot::Receiver<Completion>,
}

impl Future for Completed {
    type Output = Completion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Completion> {
        // A sender dropped without firing means the response never reached
        // the transport at all.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Completion::Close))
    }
}

/// The sending half: every listener registered on one response.
#[derive(Debug, Default)]
pub(crate) struct Notifier {
    listeners: Vec<oneshot::Sender<Completion>>,
}

impl Notifier {
    pub(crate) fn subscribe(&mut self) -> Completed {
        let (tx, rx) = oneshot::channel();
        self.listeners.push(tx);
        Completed { rx }
    }

    /// Fires `event` to every listener. Later calls are no-ops.
    fn notify(&mut self, event: Completion) {
        for tx in self.listeners.drain(..) {
            let _ = tx.send(event);
        }
    }
}

/// The body hyper actually writes: the response body plus its notifier.
///
/// Finish fires as soon as the last frame is produced. Dropping the body
/// fires Finish if it had been fully produced, or if the protocol never
/// meant to send it, and Close otherwise.
#[derive(Debug)]
pub struct Outgoing {
    body: Body,
    notifier: Notifier,
    bodiless: bool,
}

impl Outgoing {
    pub(crate) fn new(body: Body, notifier: Notifier) -> Self {
        Self { body, notifier, bodiless: false }
    }

    /// Marks a body the transport will discard unread: the answer to a
    /// `HEAD` request, or a status that forbids content. Dropping it then
    /// counts as finishing.
    pub(crate) fn mark_bodiless(&mut self) {
        self.bodiless = true;
    }
}

impl http_body::Body for Outgoing {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Error>>> {
        let this = self.get_mut();
        let frame = std::task::ready!(Pin::new(&mut this.body).poll_frame(cx));
        if frame.is_none() || this.body.is_end_stream() {
            this.notifier.notify(Completion::Finish);
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.body.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.body.size_hint()
    }
}

impl Drop for Outgoing {
    fn drop(&mut self) {
        let event = if self.bodiless || self.body.is_end_stream() {
            Completion::Finish
        } else {
            Completion::Close
        };
        self.notifier.notify(event);
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn finishing_a_body_fires_finish_once() {
        let mut notifier = Notifier::default();
        let first = notifier.subscribe();
        let second = notifier.subscribe();

        let outgoing = Outgoing::new(Body::full("Hello World"), notifier);
        let bytes = outgoing.collect().await.unwrap().to_bytes();

        assert_eq!(&bytes[..], b"Hello World");
        assert_eq!(first.await, Completion::Finish);
        assert_eq!(second.await, Completion::Finish);
    }

    #[tokio::test]
    async fn dropping_a_half_written_stream_fires_close() {
        let mut notifier = Notifier::default();
        let done = notifier.subscribe();

        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"one")),
            Ok(Bytes::from_static(b"two")),
        ]);
        let mut outgoing = Outgoing::new(Body::stream(chunks), notifier);
        let _ = outgoing.frame().await;
        drop(outgoing);

        assert_eq!(done.await, Completion::Close);
    }

    #[tokio::test]
    async fn close_after_finish_is_never_observed() {
        let mut notifier = Notifier::default();
        let done = notifier.subscribe();

        let chunks = stream::iter(vec![Ok(Bytes::from_static(b"x"))]);
        let mut outgoing = Outgoing::new(Body::stream(chunks), notifier);
        while outgoing.frame().await.is_some() {}
        // The listener was already consumed by Finish.
        outgoing.notifier.notify(Completion::Close);
        drop(outgoing);

        assert_eq!(done.await, Completion::Finish);
    }

    #[tokio::test]
    async fn dropping_an_unread_bodiless_response_fires_finish() {
        let mut notifier = Notifier::default();
        let done = notifier.subscribe();

        let mut outgoing = Outgoing::new(Body::full("Hello World"), notifier);
        outgoing.mark_bodiless();
        drop(outgoing);

        assert_eq!(done.await, Completion::Finish);
    }

    #[tokio::test]
    async fn a_response_that_never_reaches_the_transport_counts_as_closed() {
        let mut notifier = Notifier::default();
        let done = notifier.subscribe();
        drop(notifier);

        assert_eq!(done.await, Completion::Close);
    }
}
