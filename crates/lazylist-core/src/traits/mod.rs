//! Collaborator traits consumed by the list engine.

mod events;
mod signer;
mod source;

pub use events::{EventSource, ListEventStream};
pub use signer::ObjectSigner;
pub use source::{DataSource, FetchParams, SearchFilters, SearchQuery, SearchSource};
