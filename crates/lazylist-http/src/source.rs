//! HTTP-backed list and search sources.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use lazylist_core::{
    DataSource, FetchParams, ItemSchema, ListItem, Page, Result, SearchQuery, SearchSource,
};

use crate::client::HttpClient;
use crate::wire::{ListRequest, parse_page, search_request};

/// A [`DataSource`] and [`SearchSource`] over command-style POST endpoints.
///
/// Pages are requested with `{"command", "limit", "lastEvaluatedKey"}` and
/// the response's `lastEvaluatedKey` becomes the next cursor.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: HttpClient,
    schema: ItemSchema,
}

impl HttpDataSource {
    /// Create a source that parses items with `schema`.
    pub fn new(client: HttpClient, schema: ItemSchema) -> Self {
        Self { client, schema }
    }

    /// The schema used to parse items.
    pub fn schema(&self) -> &ItemSchema {
        &self.schema
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    #[instrument(skip(self, params), fields(limit = params.limit))]
    async fn fetch(&self, command: &str, params: FetchParams) -> Result<Page> {
        let request = ListRequest {
            command,
            limit: params.limit,
            last_evaluated_key: params.cursor.as_ref().map(|c| c.as_value()),
        };
        let body: Value = self.client.post(command, &request).await?;
        let page = parse_page(&self.schema, body)?;
        debug!(items = page.items.len(), has_cursor = page.cursor.is_some(), "page received");
        Ok(page)
    }
}

#[async_trait]
impl SearchSource for HttpDataSource {
    #[instrument(skip(self, query), fields(text = %query.text))]
    async fn search(&self, command: &str, query: &SearchQuery) -> Result<Vec<ListItem>> {
        let body: Value = self
            .client
            .post(command, &search_request(command, query))
            .await?;
        // Search is single-page; any cursor in the response is ignored.
        let page = parse_page(&self.schema, body)?;
        debug!(items = page.items.len(), "search results received");
        Ok(page.items)
    }
}
