//! lazylist-file - Filesystem-backed collaborators for lazylist.
//!
//! A [`FileStore`] keeps items as JSON files, media objects by key, and an
//! append-only event log. The store backs all four collaborator traits so
//! a screen can run entirely offline.
//!
//! ```no_run
//! use lazylist::{ListConfig, ListScreen};
//! use lazylist_file::{FileDataSource, FileEventSource, FileObjectSigner, FileStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::new("./data");
//! let source = FileDataSource::new(store.clone());
//! let screen = ListScreen::new(
//!     source.clone(),
//!     source,
//!     FileObjectSigner::new(store.clone()),
//!     &ListConfig::default(),
//! )?;
//! screen.attach_realtime(&FileEventSource::new(store))?;
//! screen.load_more().await?;
//! # Ok(())
//! # }
//! ```

mod events;
mod signer;
mod source;
mod store;

pub use events::{FileEventSource, FileEventStream};
pub use signer::{DEFAULT_TTL, FileObjectSigner};
pub use source::FileDataSource;
pub use store::{FileStore, LogEntry};
