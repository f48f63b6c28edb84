//! In-process realtime event bus.
//!
//! Publishers (a websocket reader, a local store, a test) push
//! [`ListEvent`]s; every list screen subscribed at the time receives them as
//! a stream. Subscriptions end when the subscriber drops its stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use lazylist_core::{EventSource, ListEvent, Result};

const DEFAULT_CAPACITY: usize = 256;

/// A typed broadcast channel for list patches.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ListEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to 256 events per slow subscriber.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit per-subscriber buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Returns the number of subscribers that will see it. Publishing with
    /// no subscribers is not an error.
    pub fn publish(&self, event: ListEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(kind = kind.as_str(), receivers, "event published");
                receivers
            }
            Err(_) => {
                debug!(kind = kind.as_str(), "event dropped, no subscribers");
                0
            }
        }
    }

    /// Subscribe to events published from now on.
    pub fn stream(&self) -> BusStream {
        BusStream {
            inner: BroadcastStream::new(self.sender.subscribe()),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventBus {
    type Stream = BusStream;

    fn subscribe(&self) -> Result<Self::Stream> {
        Ok(self.stream())
    }
}

/// A subscription to an [`EventBus`].
///
/// A subscriber that falls behind by more than the bus capacity skips the
/// missed events with a warning and keeps receiving.
pub struct BusStream {
    inner: BroadcastStream<ListEvent>,
}

impl Stream for BusStream {
    type Item = Result<ListEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(Ok(event))),
                Poll::Ready(Some(Err(err))) => {
                    warn!(error = %err, "event subscriber lagged, events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl std::fmt::Debug for BusStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusStream").finish_non_exhaustive()
    }
}
