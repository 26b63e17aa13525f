//! Pass-through stream that counts the bytes flowing through it.
//!
//! A streamed response has no length until the last chunk is written, so the
//! logger splices a [`Counter`] between the handler's stream and the socket
//! and reads the [`Tally`] once the response completes.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use pin_project_lite::pin_project;

use crate::error::{Error, ErrorHandler};

/// Running byte total shared between a [`Counter`] and its reader.
#[derive(Clone, Debug, Default)]
pub struct Tally(Arc<AtomicU64>);

impl Tally {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::AcqRel);
    }
}

pin_project! {
    /// Yields exactly what the inner stream yields.
    ///
    /// Chunk sizes are added to the tally as they pass. Errors are handed to
    /// `on_error` and then yielded unchanged, so the transport still aborts.
    pub struct Counter<S> {
        #[pin]
        inner: S,
        tally: Tally,
        on_error: ErrorHandler,
    }
}

impl<S> Counter<S> {
    pub fn new(inner: S, tally: Tally, on_error: ErrorHandler) -> Self {
        Self { inner, tally, on_error }
    }
}

impl<S> Stream for Counter<S>
where
    S: Stream<Item = Result<Bytes, Error>>,
{
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = std::task::ready!(this.inner.poll_next(cx));
        match &item {
            Some(Ok(chunk)) => this.tally.add(chunk.len() as u64),
            Some(Err(err)) => (this.on_error)(err),
            None => {}
        }
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_util::{StreamExt, stream};

    use super::*;

    fn ignore() -> ErrorHandler {
        Arc::new(|_: &Error| {})
    }

    #[tokio::test]
    async fn counts_every_byte_that_passes() {
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"Hello")),
            Ok(Bytes::from_static(b" ")),
            Ok(Bytes::from_static(b"World")),
        ]);
        let tally = Tally::default();
        let counter = Counter::new(chunks, tally.clone(), ignore());

        let out: Vec<_> = counter.collect().await;
        assert_eq!(out.len(), 3);
        assert_eq!(tally.get(), 11);
    }

    #[tokio::test]
    async fn errors_reach_the_handler_and_the_consumer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_error: ErrorHandler = Arc::new(move |e: &Error| {
            sink.lock().unwrap().push(e.to_string());
        });

        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(Error::other("disk gone")),
        ]);
        let tally = Tally::default();
        let mut counter = Box::pin(Counter::new(chunks, tally.clone(), on_error));

        assert!(counter.next().await.unwrap().is_ok());
        assert!(counter.next().await.unwrap().is_err());
        assert!(counter.next().await.is_none());

        assert_eq!(tally.get(), 3);
        assert_eq!(*seen.lock().unwrap(), vec!["disk gone".to_owned()]);
    }
}
