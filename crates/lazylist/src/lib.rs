//! lazylist - Incremental list caches with lazy media resolution
//!
//! This library keeps a de-duplicated, incrementally paginated list for a
//! screen, sizes each page request from observed latency, resolves signed
//! media URLs only for rows that become visible, patches the list from
//! realtime events, and overlays debounced server-side search results.
//!
//! Collaborators (data source, search source, object signer, realtime
//! source) are traits from [`lazylist_core`]; network and filesystem
//! implementations live in `lazylist-http` and `lazylist-file`.
//!
//! # Example
//!
//! ```no_run
//! use lazylist::{ListConfig, ListScreen};
//! use lazylist_core::{DataSource, ObjectSigner, SearchQuery, SearchSource};
//!
//! # async fn example(
//! #     source: impl DataSource + 'static,
//! #     search: impl SearchSource + 'static,
//! #     signer: impl ObjectSigner,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let screen = ListScreen::new(source, search, signer, &ListConfig::default())?;
//! screen.load_more().await?;
//!
//! let visible: Vec<_> = screen.rows().iter().take(8).map(|r| r.item.id.clone()).collect();
//! screen.on_viewable_items_changed(&visible).await;
//!
//! screen.search(SearchQuery::text("engineer")).await?;
//! for row in screen.rows() {
//!     println!("{} {:?}", row.item.id, row.media);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod cache;
pub mod config;
pub mod error;
pub mod page_sizer;
pub mod resolver;
pub mod screen;
pub mod search;
pub mod subscription;
pub mod visibility;

mod deadline;

#[cfg(test)]
mod testing;

pub use bus::{BusStream, EventBus};
pub use cache::{FetchOutcome, PaginatedListCache};
pub use config::{ListConfig, PageSizeConfig};
pub use error::{FetchError, SearchError};
pub use page_sizer::AdaptivePageSizer;
pub use resolver::SignedUrlResolver;
pub use screen::{ListScreen, Row};
pub use search::{SearchOutcome, SearchOverlayCache, SearchPhase, SearchSnapshot};
pub use subscription::{AppliedPatch, PatchSubscription, subscribe_patches};
pub use visibility::VisibilityTracker;

pub use lazylist_core::{
    AvatarFallbackGenerator, Cursor, DataSource, Error, EventSource, FailureReason, ItemId,
    ListEvent, ListItem, MediaKey, ObjectSigner, Page, Placeholder, ResolvedMedia, SearchQuery,
    SearchSource,
};
