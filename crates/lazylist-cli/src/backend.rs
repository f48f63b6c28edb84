//! Collaborators selected by the source URL scheme.
//!
//! `file://` sources use a local [`FileStore`]; `http(s)://` sources use the
//! JSON RPC endpoint, its signer, and its WebSocket feed.

use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::Stream;
use tracing::debug;

use lazylist::{ListConfig, ListScreen};
use lazylist_core::{
    DataSource, EventSource, FetchParams, ItemSchema, ListEvent, ListItem, MediaKey,
    ObjectSigner, Page, SearchQuery, SearchSource, SourceUrl,
};
use lazylist_file::{FileDataSource, FileEventSource, FileObjectSigner, FileStore};
use lazylist_http::{HttpClient, HttpDataSource, HttpObjectSigner, WsEventSource};

use crate::profile::Profile;

const DEFAULT_EVENTS_PATH: &str = "realtime";

pub type CliScreen = ListScreen<Arc<AnySource>, Arc<AnySource>, AnySigner>;

#[derive(Debug)]
pub enum AnySource {
    File(FileDataSource),
    Http(HttpDataSource),
}

#[async_trait]
impl DataSource for AnySource {
    async fn fetch(&self, command: &str, params: FetchParams) -> lazylist_core::Result<Page> {
        match self {
            AnySource::File(source) => source.fetch(command, params).await,
            AnySource::Http(source) => source.fetch(command, params).await,
        }
    }
}

#[async_trait]
impl SearchSource for AnySource {
    async fn search(
        &self,
        command: &str,
        query: &SearchQuery,
    ) -> lazylist_core::Result<Vec<ListItem>> {
        match self {
            AnySource::File(source) => source.search(command, query).await,
            AnySource::Http(source) => source.search(command, query).await,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AnySigner {
    File(FileObjectSigner),
    Http(HttpObjectSigner),
}

#[async_trait]
impl ObjectSigner for AnySigner {
    async fn sign(&self, key: &MediaKey) -> lazylist_core::Result<String> {
        match self {
            AnySigner::File(signer) => signer.sign(key).await,
            AnySigner::Http(signer) => signer.sign(key).await,
        }
    }
}

#[derive(Debug)]
pub enum AnyEvents {
    File(FileEventSource),
    Ws(WsEventSource),
}

impl EventSource for AnyEvents {
    type Stream = Pin<Box<dyn Stream<Item = lazylist_core::Result<ListEvent>> + Send>>;

    fn subscribe(&self) -> lazylist_core::Result<Self::Stream> {
        Ok(match self {
            AnyEvents::File(source) => Box::pin(source.subscribe()?),
            AnyEvents::Ws(source) => Box::pin(source.subscribe()?),
        })
    }
}

/// Collaborators and list settings for one endpoint.
#[derive(Debug)]
pub struct Backend {
    pub source: Arc<AnySource>,
    pub signer: AnySigner,
    pub events: AnyEvents,
    pub config: ListConfig,
    pub schema: ItemSchema,
    store: Option<FileStore>,
}

impl Backend {
    /// Build collaborators for the profile's source.
    pub fn connect(profile: &Profile) -> Result<Self> {
        let source = profile.source.as_deref().context(
            "No source configured. Pass --source, set LAZYLIST_SOURCE, \
             or run 'lazylist profile set --source <url>'.",
        )?;
        let source_url = SourceUrl::new(source).context("Invalid source URL")?;
        let schema = profile.schema();

        let mut config = ListConfig::default();
        if let Some(command) = &profile.command {
            config.command.clone_from(command);
        }
        if let Some(command) = &profile.search_command {
            config.search_command.clone_from(command);
        }

        if source_url.is_local() {
            let path = source_url
                .to_file_path()
                .context("Failed to convert file:// URL to path")?;
            let store = FileStore::with_schema(&path, schema.clone());
            debug!(root = %path.display(), "using file store");

            return Ok(Self {
                source: Arc::new(AnySource::File(FileDataSource::new(store.clone()))),
                signer: AnySigner::File(FileObjectSigner::new(store.clone())),
                events: AnyEvents::File(FileEventSource::new(store.clone())),
                config,
                schema,
                store: Some(store),
            });
        }

        let client = http_client(source_url.clone(), profile.token.as_deref())?;
        let signer_client = match &profile.signer {
            Some(url) => {
                let url = SourceUrl::new(url).context("Invalid signer URL")?;
                http_client(url, profile.token.as_deref())?
            }
            None => client.clone(),
        };
        let events_path = profile.events_path.as_deref().unwrap_or(DEFAULT_EVENTS_PATH);
        debug!(source = %source_url, events_path, "using HTTP endpoint");

        Ok(Self {
            source: Arc::new(AnySource::Http(HttpDataSource::new(client, schema.clone()))),
            signer: AnySigner::Http(HttpObjectSigner::new(signer_client)),
            events: AnyEvents::Ws(WsEventSource::new(&source_url, events_path, schema.clone())),
            config,
            schema,
            store: None,
        })
    }

    /// A list screen over these collaborators.
    pub fn screen(&self) -> Result<CliScreen> {
        ListScreen::new(
            self.source.clone(),
            self.source.clone(),
            self.signer.clone(),
            &self.config,
        )
        .context("Invalid list configuration")
    }

    /// The local store, for commands that write.
    pub fn file_store(&self) -> Result<&FileStore> {
        self.store
            .as_ref()
            .context("This command needs a file:// source")
    }
}

fn http_client(url: SourceUrl, token: Option<&str>) -> Result<HttpClient> {
    match token {
        Some(token) => HttpClient::with_token(url, token),
        None => HttpClient::new(url),
    }
    .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sources_use_the_store() {
        let profile = Profile {
            source: Some("file:///tmp/lazylist-store".into()),
            command: Some("getUsers".into()),
            ..Profile::default()
        };
        let backend = Backend::connect(&profile).unwrap();

        assert!(matches!(*backend.source, AnySource::File(_)));
        assert!(matches!(backend.events, AnyEvents::File(_)));
        assert_eq!(backend.config.command, "getUsers");
        assert!(backend.file_store().is_ok());
    }

    #[test]
    fn https_sources_use_rpc() {
        let profile = Profile {
            source: Some("https://api.example.com/dev".into()),
            ..Profile::default()
        };
        let backend = Backend::connect(&profile).unwrap();

        assert!(matches!(*backend.source, AnySource::Http(_)));
        assert!(matches!(backend.signer, AnySigner::Http(_)));
        match &backend.events {
            AnyEvents::Ws(ws) => assert!(ws.url().starts_with("wss://")),
            other => panic!("expected websocket events, got {:?}", other),
        }
        assert!(backend.file_store().is_err());
    }

    #[test]
    fn missing_source_is_an_error() {
        let err = Backend::connect(&Profile::default()).unwrap_err();
        assert!(err.to_string().contains("No source configured"));
    }
}
