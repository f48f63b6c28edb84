//! File-backed list and search sources.

use async_trait::async_trait;
use tracing::{debug, instrument};

use lazylist_core::{
    DataSource, FetchParams, ListItem, Page, Result, SearchQuery, SearchSource,
};

use crate::store::FileStore;

/// Serves pages and search results from a [`FileStore`].
///
/// Every command reads the same item directory; the command name only
/// shows up in logs.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    store: FileStore,
}

impl FileDataSource {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    #[instrument(skip(self, params), fields(limit = params.limit))]
    async fn fetch(&self, command: &str, params: FetchParams) -> Result<Page> {
        let cursor = params.cursor.as_ref().and_then(|c| c.as_token());
        let page = self.store.list(params.limit, cursor)?;
        debug!(
            items = page.items.len(),
            last = page.is_last(),
            "served page"
        );
        Ok(page)
    }
}

#[async_trait]
impl SearchSource for FileDataSource {
    #[instrument(skip(self, query), fields(text = %query.text))]
    async fn search(&self, command: &str, query: &SearchQuery) -> Result<Vec<ListItem>> {
        let items = self.store.search(query)?;
        debug!(hits = items.len(), "served search");
        Ok(items)
    }
}
