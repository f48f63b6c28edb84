//! Realtime patch subscriptions.
//!
//! A [`PatchSubscription`] pumps an event stream into a
//! [`PaginatedListCache`] on a background task. It is tied to the lifetime
//! of the screen that owns it: dropping the handle stops the task.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use lazylist_core::{EventSource, ListEvent, ListEventStream, Result};

use crate::cache::PaginatedListCache;

/// A patch that reached the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPatch {
    /// The event as received.
    pub event: ListEvent,
    /// False if it was a no-op (duplicate create, unknown id).
    pub applied: bool,
    /// Cache size after the patch.
    pub len: usize,
}

/// Handle to a running patch task. Aborts the task on drop.
#[derive(Debug)]
pub struct PatchSubscription {
    handle: JoinHandle<()>,
}

impl PatchSubscription {
    /// Apply every event from `events` to `cache` until the stream ends.
    pub fn spawn<S, E>(cache: Arc<PaginatedListCache<S>>, events: E) -> Self
    where
        S: Send + Sync + 'static,
        E: ListEventStream + 'static,
    {
        Self {
            handle: tokio::spawn(pump(cache, events, None)),
        }
    }

    /// Like [`spawn`](Self::spawn), also reporting each patch on a channel.
    pub fn spawn_notifying<S, E>(
        cache: Arc<PaginatedListCache<S>>,
        events: E,
    ) -> (Self, mpsc::UnboundedReceiver<AppliedPatch>)
    where
        S: Send + Sync + 'static,
        E: ListEventStream + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = Self {
            handle: tokio::spawn(pump(cache, events, Some(tx))),
        };
        (sub, rx)
    }

    /// True once the stream has ended or the task was aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop applying patches.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for PatchSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Subscribe `cache` to a realtime source.
///
/// # Errors
///
/// Returns an error if the source refuses the subscription.
pub fn subscribe_patches<S, E>(
    cache: Arc<PaginatedListCache<S>>,
    source: &E,
) -> Result<PatchSubscription>
where
    S: Send + Sync + 'static,
    E: EventSource,
    E::Stream: 'static,
{
    let events = source.subscribe()?;
    Ok(PatchSubscription::spawn(cache, events))
}

async fn pump<S, E>(
    cache: Arc<PaginatedListCache<S>>,
    events: E,
    notify: Option<mpsc::UnboundedSender<AppliedPatch>>,
) where
    E: ListEventStream,
{
    let mut events = Box::pin(events);
    debug!(command = cache.command(), "patch subscription started");

    while let Some(next) = events.next().await {
        let event = match next {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "realtime event error, skipping");
                continue;
            }
        };

        let applied = cache.apply_event(event.clone());
        let len = cache.len();
        debug!(
            kind = event.kind().as_str(),
            id = %event.id(),
            applied,
            len,
            "patch received"
        );

        if let Some(tx) = &notify {
            let _ = tx.send(AppliedPatch {
                event,
                applied,
                len,
            });
        }
    }

    info!(command = cache.command(), "realtime stream ended");
}
