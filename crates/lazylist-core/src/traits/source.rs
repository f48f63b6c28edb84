//! List and search source traits.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::Result;
use crate::item::{ListItem, Page};
use crate::types::Cursor;

/// Parameters for one page request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    /// Requested page size.
    pub limit: u32,
    /// Where to resume; `None` for the first page.
    pub cursor: Option<Cursor>,
}

/// Filters attached to a search, keyed by field name.
pub type SearchFilters = BTreeMap<String, serde_json::Value>;

/// A server-side search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Free text typed by the user.
    pub text: String,
    /// Structured filters (category, location, ...).
    pub filters: SearchFilters,
}

impl SearchQuery {
    /// A text-only query.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: SearchFilters::new(),
        }
    }

    /// Add a filter.
    pub fn with_filter(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.filters.insert(field.into(), value);
        self
    }

    /// True when there is nothing to search for.
    ///
    /// Blank text counts as empty; filters with a `null` or `""` value are ignored.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.filters.values().all(|v| match v {
                serde_json::Value::Null => true,
                serde_json::Value::String(s) => s.trim().is_empty(),
                _ => false,
            })
    }
}

/// A paginated list endpoint.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch one page of items for a command.
    async fn fetch(&self, command: &str, params: FetchParams) -> Result<Page>;
}

/// A server-side search endpoint. Results are a single page.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Run a search for a command.
    async fn search(&self, command: &str, query: &SearchQuery) -> Result<Vec<ListItem>>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for std::sync::Arc<T> {
    async fn fetch(&self, command: &str, params: FetchParams) -> Result<Page> {
        (**self).fetch(command, params).await
    }
}

#[async_trait]
impl<T: SearchSource + ?Sized> SearchSource for std::sync::Arc<T> {
    async fn search(&self, command: &str, query: &SearchQuery) -> Result<Vec<ListItem>> {
        (**self).search(command, query).await
    }
}
