//! Realtime patch events.

use serde::{Deserialize, Serialize};

use super::ListItem;
use crate::types::ItemId;

/// A patch delivered by a realtime channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// A new item was created; it belongs at the front of the list.
    Created(ListItem),

    /// An existing item changed; it keeps its position.
    Updated(ListItem),

    /// An item was removed.
    Deleted(ItemId),
}

impl ListEvent {
    /// The id this event affects.
    pub fn id(&self) -> &ItemId {
        match self {
            ListEvent::Created(item) | ListEvent::Updated(item) => &item.id,
            ListEvent::Deleted(id) => id,
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ListEvent::Created(_) => EventKind::Created,
            ListEvent::Updated(_) => EventKind::Updated,
            ListEvent::Deleted(_) => EventKind::Deleted,
        }
    }
}

/// The type tag of a realtime event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// An item was created.
    Created,
    /// An item was updated.
    Updated,
    /// An item was deleted.
    Deleted,
}

impl EventKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
        }
    }
}

/// The wire form of a realtime event: `{"type": ..., "payload": ...}`.
///
/// The payload stays untyped until an [`ItemSchema`](super::ItemSchema)
/// turns it into a [`ListEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListEvent {
    /// The event type.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// The item (created/updated) or its id (deleted).
    #[serde(default)]
    pub payload: serde_json::Value,
}
