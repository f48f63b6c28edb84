//! Realtime event traits.

use futures_core::Stream;

use crate::Result;
use crate::item::ListEvent;

/// A stream of realtime patches.
pub trait ListEventStream: Stream<Item = Result<ListEvent>> + Send {}

impl<T> ListEventStream for T where T: Stream<Item = Result<ListEvent>> + Send {}

/// A channel that delivers created/updated/deleted patches.
pub trait EventSource: Send + Sync {
    /// Stream type produced by this source.
    type Stream: ListEventStream;

    /// Subscribe to patches from now on.
    fn subscribe(&self) -> Result<Self::Stream>;
}
