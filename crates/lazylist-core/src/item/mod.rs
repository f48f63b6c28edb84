//! List items and the events that patch them.
//!
//! Payloads arrive as untyped JSON; [`ItemSchema`] is the single place where
//! they are validated and turned into [`ListItem`]s.

mod events;
mod schema;
mod types;

pub use events::{EventKind, ListEvent, RawListEvent};
pub use schema::ItemSchema;
pub use types::{ListItem, Page, Placeholder, ResolvedMedia};
