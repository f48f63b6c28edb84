//! Core lazylist types.
//!
//! These types enforce their invariants at construction time,
//! so invalid ids, keys, and endpoints never reach the cache.

mod cursor;
mod item_id;
mod media_key;
mod source_url;

pub use cursor::Cursor;
pub use item_id::ItemId;
pub use media_key::MediaKey;
pub use source_url::SourceUrl;
