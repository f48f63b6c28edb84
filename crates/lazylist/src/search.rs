//! Server-side search overlay.
//!
//! While a query is active the overlay replaces the paginated list on
//! screen. Input is debounced: each keystroke restarts the quiet window and
//! cancels whatever the previous keystroke scheduled, including a request
//! already in flight. Every input bumps a generation counter, and a result
//! whose generation is no longer current is dropped on arrival.
//!
//! Observers follow the overlay through a [`watch`] channel of
//! [`SearchSnapshot`]s.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use lazylist_core::{Error, FailureReason, ListItem, SearchQuery, SearchSource};

use crate::config::ListConfig;
use crate::deadline::with_deadline;
use crate::error::SearchError;

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query; the paginated list is shown.
    Idle,
    /// Waiting for input to settle.
    Debouncing,
    /// A request is in flight.
    Fetching,
    /// Results are shown.
    Shown,
    /// The query matched nothing.
    Empty,
    /// The last request failed.
    Errored(FailureReason),
}

/// The overlay as observers see it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub phase: SearchPhase,
    /// The query the phase refers to.
    pub query: SearchQuery,
    /// Results for `query`; empty unless `phase` is `Shown`.
    pub items: Vec<ListItem>,
    /// Bumped on every input. Results for older generations are dropped.
    pub generation: u64,
}

impl SearchSnapshot {
    fn idle(generation: u64) -> Self {
        Self {
            phase: SearchPhase::Idle,
            query: SearchQuery::default(),
            items: Vec::new(),
            generation,
        }
    }

    /// True if the overlay replaces the paginated list.
    pub fn is_active(&self) -> bool {
        self.phase != SearchPhase::Idle
    }
}

/// What a call to [`SearchOverlayCache::search`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// This many results are shown.
    Shown(usize),
    /// The query matched nothing.
    Empty,
    /// The query was empty; the overlay is off.
    Cleared,
    /// Newer input arrived first; the result was dropped.
    Superseded,
}

struct Inner<Q> {
    source: Q,
    command: String,
    timeout: Duration,
    state: watch::Sender<SearchSnapshot>,
}

/// Debounced, generation-checked search results for one screen.
pub struct SearchOverlayCache<Q> {
    inner: Arc<Inner<Q>>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<Q: SearchSource + 'static> SearchOverlayCache<Q> {
    /// Create an idle overlay.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` does not validate.
    pub fn new(source: Q, config: &ListConfig) -> Result<Self, Error> {
        config.validate()?;
        let (state, _) = watch::channel(SearchSnapshot::idle(0));
        Ok(Self {
            inner: Arc::new(Inner {
                source,
                command: config.search_command.clone(),
                timeout: config.request_timeout(),
                state,
            }),
            debounce: config.search_debounce(),
            pending: Mutex::new(None),
        })
    }

    /// Feed a keystroke (or filter change).
    ///
    /// An empty query turns the overlay off at once. Anything else is sent
    /// after the debounce window unless newer input arrives first. Must be
    /// called from within a tokio runtime.
    pub fn input(&self, query: SearchQuery) {
        if query.is_empty() {
            self.clear();
            return;
        }

        let generation = self.begin(query.clone(), SearchPhase::Debouncing);
        let inner = self.inner.clone();
        let debounce = self.debounce;
        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Let a keystroke woken at the same instant land first; `run`
            // then sees the bumped generation and never sends.
            tokio::task::yield_now().await;
            // Failures are already logged and reflected in the snapshot.
            let _ = inner.run(generation, query).await;
        });
        self.replace_pending(Some(task));
    }

    /// Run a query now, skipping the debounce window.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if the source fails or times out and no
    /// newer input has arrived meanwhile.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchOutcome, SearchError> {
        if query.is_empty() {
            self.clear();
            return Ok(SearchOutcome::Cleared);
        }
        let generation = self.begin(query.clone(), SearchPhase::Fetching);
        self.replace_pending(None);
        self.inner.run(generation, query).await
    }
}

impl<Q> SearchOverlayCache<Q> {
    /// Turn the overlay off and drop any pending request.
    pub fn clear(&self) {
        self.replace_pending(None);
        self.inner.state.send_modify(|s| {
            *s = SearchSnapshot::idle(s.generation + 1);
        });
        debug!("search overlay cleared");
    }

    /// The current overlay state.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Follow overlay changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.state.subscribe()
    }

    /// True if the overlay replaces the paginated list.
    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().is_active()
    }

    /// The current phase.
    pub fn phase(&self) -> SearchPhase {
        self.inner.state.borrow().phase
    }

    fn begin(&self, query: SearchQuery, phase: SearchPhase) -> u64 {
        let mut generation = 0;
        self.inner.state.send_modify(|s| {
            s.generation += 1;
            s.phase = phase;
            s.query = query;
            s.items.clear();
            generation = s.generation;
        });
        generation
    }

    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = std::mem::replace(&mut *pending, next) {
            previous.abort();
        }
    }
}

impl<Q> Drop for SearchOverlayCache<Q> {
    fn drop(&mut self) {
        self.replace_pending(None);
    }
}

impl<Q> std::fmt::Debug for SearchOverlayCache<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOverlayCache")
            .field("command", &self.inner.command)
            .field("debounce", &self.debounce)
            .field("snapshot", &*self.inner.state.borrow())
            .finish()
    }
}

impl<Q: SearchSource> Inner<Q> {
    #[instrument(skip_all, fields(command = %self.command, generation = generation))]
    async fn run(&self, generation: u64, query: SearchQuery) -> Result<SearchOutcome, SearchError> {
        let started = self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            s.phase = SearchPhase::Fetching;
            true
        });
        if !started {
            return Ok(SearchOutcome::Superseded);
        }

        debug!(text = %query.text, filters = query.filters.len(), "sending search");
        let result = with_deadline(self.timeout, self.source.search(&self.command, &query)).await;

        let mut current = false;
        let mut shown = 0;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            current = true;
            match &result {
                Ok(items) => {
                    s.items = dedup(items);
                    shown = s.items.len();
                    s.phase = if shown == 0 {
                        SearchPhase::Empty
                    } else {
                        SearchPhase::Shown
                    };
                }
                Err(e) => {
                    s.phase = SearchPhase::Errored(e.reason());
                    s.items.clear();
                }
            }
            true
        });

        if !current {
            debug!("search result superseded, dropping");
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(_) if shown == 0 => {
                info!("search matched nothing");
                Ok(SearchOutcome::Empty)
            }
            Ok(_) => {
                info!(shown, "search results shown");
                Ok(SearchOutcome::Shown(shown))
            }
            Err(e) => {
                warn!(reason = %e.reason(), error = %e, "search failed");
                Err(e.into())
            }
        }
    }
}

fn dedup(items: &[ListItem]) -> Vec<ListItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.id.clone()))
        .cloned()
        .collect()
}
