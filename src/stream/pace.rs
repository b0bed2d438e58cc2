//! Request pacing utilities

use futures::{Stream, StreamExt, TryStreamExt, ready, stream};
use pin_project_lite::pin_project;
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep, sleep};

use crate::Result;

/// Rate bound for a fan-out over a key set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Wait applied before each request is issued
    pub delay: Duration,
    /// Requests allowed in flight at once
    pub max_in_flight: NonZeroUsize,
}

impl Pacing {
    pub fn new(delay: Duration, max_in_flight: NonZeroUsize) -> Self {
        Self { delay, max_in_flight }
    }

    /// One request at a time, each preceded by `delay`.
    pub fn sequential(delay: Duration) -> Self {
        Self::new(delay, NonZeroUsize::MIN)
    }
}

/// Extension trait to add pacing to any Stream
pub trait PaceExt: Stream {
    /// Delay every item by `delay`, measured from when the consumer asks for it.
    ///
    /// Unlike a fixed-rate ticker, a slow consumer never earns a burst: each
    /// item waits the full delay after it is requested.
    fn paced(self, delay: Duration) -> Paced<Self>
    where
        Self: Sized,
    {
        Paced::new(self, delay)
    }
}

impl<T: Stream> PaceExt for T {}

pin_project! {
    /// A stream combinator that holds each item for a fixed delay
    pub struct Paced<S: Stream> {
        #[pin]
        stream: S,
        #[pin]
        sleep: Sleep,
        delay: Duration,
        pending: Option<S::Item>,
    }
}

impl<S: Stream> Paced<S> {
    /// Create a new paced stream
    pub fn new(stream: S, delay: Duration) -> Self {
        Self { stream, sleep: sleep(Duration::ZERO), delay, pending: None }
    }
}

impl<S: Stream> Stream for Paced<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if this.pending.is_none() {
            // End of stream is reported without waiting
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            if this.delay.is_zero() {
                return Poll::Ready(Some(item));
            }
            *this.pending = Some(item);
            this.sleep.as_mut().reset(Instant::now() + *this.delay);
        }

        ready!(this.sleep.as_mut().poll(cx));
        Poll::Ready(this.pending.take())
    }
}

/// Issue one `fetch` per key under `pacing` and flatten the batches in key order.
///
/// With `max_in_flight == 1` requests never overlap. The first failure drops
/// the remaining keys and is returned as is.
pub async fn paced_fan_out<K, T, F, Fut>(
    keys: impl IntoIterator<Item = K>,
    pacing: Pacing,
    fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(K) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let batches: Vec<Vec<T>> = stream::iter(keys)
        .paced(pacing.delay)
        .map(fetch)
        .buffered(pacing.max_in_flight.get())
        .try_collect()
        .await?;

    Ok(batches.into_iter().flatten().collect())
}
