//! In-memory collaborators for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use lazylist_core::error::{ProtocolError, TransportError};
use lazylist_core::{
    Cursor, DataSource, Error, FetchParams, ItemId, ListItem, MediaKey, ObjectSigner, Page,
    Result, SearchQuery, SearchSource,
};

pub(crate) fn id(s: &str) -> ItemId {
    ItemId::new(s).unwrap()
}

pub(crate) fn item(s: &str) -> ListItem {
    ListItem::new(id(s))
}

pub(crate) fn item_with_media(s: &str, key: &str) -> ListItem {
    ListItem::new(id(s)).with_media(MediaKey::new(key).unwrap())
}

pub(crate) fn items(prefix: &str, range: std::ops::Range<usize>) -> Vec<ListItem> {
    range.map(|i| item(&format!("{prefix}{i}"))).collect()
}

pub(crate) fn ids_of(items: &[ListItem]) -> Vec<String> {
    items.iter().map(|i| i.id.as_str().to_string()).collect()
}

/// Replays queued responses in call order, after an optional delay.
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page>>>,
    delay: Duration,
    delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<FetchParams>>,
}

impl ScriptedSource {
    pub(crate) fn new(responses: Vec<Result<Page>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: Duration::ZERO,
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Per-call delays, consumed in order before falling back to `with_delay`.
    pub(crate) fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub(crate) fn calls(&self) -> Vec<FetchParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch(&self, _command: &str, params: FetchParams) -> Result<Page> {
        self.calls.lock().unwrap().push(params);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::new(Vec::new(), None)));
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

pub(crate) fn server_error() -> Error {
    Error::Protocol(ProtocolError::new(500, None, Some("boom".into())))
}

pub(crate) fn network_error() -> Error {
    Error::Transport(TransportError::Connection {
        message: "refused".into(),
    })
}

/// Serves a fixed dataset in pages, using the next offset as the cursor.
pub(crate) struct PagedSource {
    items: Vec<ListItem>,
}

impl PagedSource {
    pub(crate) fn new(items: Vec<ListItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl DataSource for PagedSource {
    async fn fetch(&self, _command: &str, params: FetchParams) -> Result<Page> {
        let start = params
            .cursor
            .as_ref()
            .and_then(|c| c.as_token())
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + params.limit as usize).min(self.items.len());
        let page_items = self.items[start.min(end)..end].to_vec();
        let cursor = (end < self.items.len()).then(|| Cursor::token(end.to_string()));
        Ok(Page::new(page_items, cursor).with_count(self.items.len() as u64))
    }
}

/// Search over a fixed dataset by id substring, recording every query.
pub(crate) struct RecordingSearch {
    items: Vec<ListItem>,
    delay: Duration,
    fail: bool,
    queries: Mutex<Vec<SearchQuery>>,
}

impl RecordingSearch {
    pub(crate) fn new(items: Vec<ListItem>) -> Self {
        Self {
            items,
            delay: Duration::ZERO,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub(crate) fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchSource for RecordingSearch {
    async fn search(&self, _command: &str, query: &SearchQuery) -> Result<Vec<ListItem>> {
        self.queries.lock().unwrap().push(query.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(network_error());
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.id.as_str().contains(query.text.trim()))
            .cloned()
            .collect())
    }
}

/// Signs keys as `https://cdn.test/<key>?sig=1`; keys in `failing` error out.
#[derive(Default)]
pub(crate) struct CountingSigner {
    failing: HashSet<String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingSigner {
    pub(crate) fn failing_on(keys: &[&str]) -> Self {
        Self {
            failing: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectSigner for CountingSigner {
    async fn sign(&self, key: &MediaKey) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(key.as_str()) {
            return Err(server_error());
        }
        Ok(format!("https://cdn.test/{}?sig=1", key))
    }
}
