//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lazylist::{
    Cursor, DataSource, Error, ItemId, ListItem, MediaKey, ObjectSigner, Page, SearchQuery,
    SearchSource,
};
use lazylist_core::{FetchParams, Result};
use lazylist_core::error::TransportError;

pub fn id(s: &str) -> ItemId {
    ItemId::new(s).unwrap()
}

pub fn item(s: &str) -> ListItem {
    ListItem::new(id(s))
}

pub fn ids(items: &[ListItem]) -> Vec<String> {
    items.iter().map(|i| i.id.to_string()).collect()
}

/// Serves queued pages in call order, each after `delay`.
pub struct QueuedPages {
    pages: Mutex<VecDeque<Page>>,
    delay: Duration,
}

impl QueuedPages {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// One page per id batch, chained with numbered cursors.
    pub fn from_batches(batches: &[Vec<String>]) -> Self {
        let pages = batches
            .iter()
            .enumerate()
            .map(|(i, batch)| {
                let items = batch.iter().map(|s| item(s)).collect();
                let cursor = (i + 1 < batches.len()).then(|| Cursor::token(format!("c{}", i + 1)));
                Page::new(items, cursor)
            })
            .collect();
        Self::new(pages)
    }
}

#[async_trait]
impl DataSource for QueuedPages {
    async fn fetch(&self, _command: &str, _params: FetchParams) -> Result<Page> {
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Page::new(Vec::new(), None));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(page)
    }
}

/// Matches items whose display name contains the query text.
pub struct NameSearch {
    items: Vec<ListItem>,
}

impl NameSearch {
    pub fn new(items: Vec<ListItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl SearchSource for NameSearch {
    async fn search(&self, _command: &str, query: &SearchQuery) -> Result<Vec<ListItem>> {
        let needle = query.text.trim().to_lowercase();
        Ok(self
            .items
            .iter()
            .filter(|i| i.fallback_name().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

/// Signs every key except those under `broken/`.
pub struct PrefixSigner;

#[async_trait]
impl ObjectSigner for PrefixSigner {
    async fn sign(&self, key: &MediaKey) -> Result<String> {
        if key.as_str().starts_with("broken/") {
            return Err(Error::Transport(TransportError::Connection {
                message: "signer unreachable".into(),
            }));
        }
        Ok(format!("https://media.test/{key}?token=t"))
    }
}
