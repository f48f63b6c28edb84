//! lazylist-core - Core types and traits for incremental list caches.

pub mod avatar;
pub mod error;
pub mod item;
pub mod traits;
pub mod types;

pub use avatar::AvatarFallbackGenerator;
pub use error::{Error, FailureReason};
pub use item::{
    EventKind, ItemSchema, ListEvent, ListItem, Page, Placeholder, RawListEvent, ResolvedMedia,
};
pub use traits::{
    DataSource, EventSource, FetchParams, ListEventStream, ObjectSigner, SearchFilters,
    SearchQuery, SearchSource,
};
pub use types::{Cursor, ItemId, MediaKey, SourceUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
