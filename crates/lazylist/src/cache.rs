//! Incremental paginated list cache.
//!
//! The cache holds the de-duplicated, ordered items fetched so far for one
//! screen. Pages are appended in server order behind an in-flight flag, so
//! fetches never overlap. Realtime patches (create/update/delete) apply at
//! any time, including while a fetch is pending; de-duplication by id keeps
//! the two paths from producing duplicates.
//!
//! # Example
//!
//! ```no_run
//! use lazylist::{FetchOutcome, ListConfig, PaginatedListCache};
//! # use lazylist_core::DataSource;
//!
//! # async fn example(source: impl DataSource) -> Result<(), Box<dyn std::error::Error>> {
//! let cache = PaginatedListCache::new(source, &ListConfig::default())?;
//!
//! while cache.has_more() {
//!     match cache.fetch_next().await? {
//!         FetchOutcome::Fetched { added, .. } => println!("{added} new items"),
//!         _ => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use lazylist_core::{Cursor, DataSource, Error, FetchParams, ItemId, ListEvent, ListItem, Page};

use crate::config::ListConfig;
use crate::deadline::with_deadline;
use crate::error::FetchError;
use crate::page_sizer::AdaptivePageSizer;

/// What a call to [`PaginatedListCache::fetch_next`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A page was fetched and merged.
    Fetched {
        /// The page exactly as the source returned it.
        page: Page,
        /// How many of its items were new to the cache.
        added: usize,
    },

    /// Another fetch is in flight; nothing was requested.
    Busy,

    /// The last page was already reached; nothing was requested.
    Exhausted,

    /// The cache was reset while this fetch was in flight; its page was dropped.
    Superseded,
}

#[derive(Debug)]
struct CacheState {
    items: IndexMap<ItemId, ListItem>,
    cursor: Option<Cursor>,
    has_more: bool,
    in_flight: bool,
    // Bumped by reset so fetches started earlier cannot merge.
    epoch: u64,
}

impl CacheState {
    fn new() -> Self {
        Self {
            items: IndexMap::new(),
            cursor: None,
            has_more: true,
            in_flight: false,
            epoch: 0,
        }
    }

    fn merge(&mut self, items: &[ListItem]) -> usize {
        let mut added = 0;
        for item in items {
            if !self.items.contains_key(&item.id) {
                self.items.insert(item.id.clone(), item.clone());
                added += 1;
            }
        }
        added
    }
}

/// The de-duplicated, ordered collection behind one list screen.
pub struct PaginatedListCache<S> {
    source: S,
    command: String,
    timeout: Duration,
    sizer: Mutex<AdaptivePageSizer>,
    state: Mutex<CacheState>,
}

impl<S: DataSource> PaginatedListCache<S> {
    /// Create an empty cache over a data source.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` does not validate.
    pub fn new(source: S, config: &ListConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            source,
            command: config.command.clone(),
            timeout: config.request_timeout(),
            sizer: Mutex::new(AdaptivePageSizer::new(config.page_size.clone())),
            state: Mutex::new(CacheState::new()),
        })
    }

    /// Fetch the next page and merge it.
    ///
    /// Returns [`FetchOutcome::Busy`] without calling the source if a fetch
    /// is already in flight, and [`FetchOutcome::Exhausted`] once the last
    /// page was seen. On failure the cache (items, cursor, `has_more`) is
    /// left exactly as it was; retrying is up to the caller.
    #[instrument(skip(self), fields(command = %self.command))]
    pub async fn fetch_next(&self) -> Result<FetchOutcome, FetchError> {
        let (cursor, epoch) = {
            let mut state = self.state();
            if state.in_flight {
                debug!("fetch already in flight");
                return Ok(FetchOutcome::Busy);
            }
            if !state.has_more {
                debug!("no more pages");
                return Ok(FetchOutcome::Exhausted);
            }
            state.in_flight = true;
            (state.cursor.clone(), state.epoch)
        };
        let _release = InFlightGuard {
            state: &self.state,
            epoch,
        };

        let limit = self.sizer().next_size();
        let params = FetchParams { limit, cursor };
        let started = Instant::now();

        let page = match with_deadline(self.timeout, self.source.fetch(&self.command, params)).await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(reason = %e.reason(), error = %e, "page fetch failed");
                return Err(e.into());
            }
        };

        let elapsed = started.elapsed();
        self.sizer().observe(elapsed);

        let mut state = self.state();
        if state.epoch != epoch {
            debug!("cache was reset during fetch, dropping page");
            return Ok(FetchOutcome::Superseded);
        }

        let added = state.merge(&page.items);
        state.has_more = !page.is_last();
        state.cursor = if state.has_more {
            page.cursor.clone()
        } else {
            None
        };

        info!(
            limit,
            received = page.items.len(),
            added,
            total = state.items.len(),
            has_more = state.has_more,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "page merged"
        );

        Ok(FetchOutcome::Fetched { page, added })
    }
}

impl<S> PaginatedListCache<S> {
    /// Clear everything so the next fetch starts from the first page.
    ///
    /// A fetch still in flight completes with [`FetchOutcome::Superseded`].
    pub fn reset(&self) {
        let mut state = self.state();
        state.items.clear();
        state.cursor = None;
        state.has_more = true;
        state.in_flight = false;
        state.epoch = state.epoch.wrapping_add(1);
        debug!(command = %self.command, "cache reset");
    }

    /// Reset, then continue pagination from a cursor saved earlier.
    pub fn resume_from(&self, cursor: Cursor) {
        self.reset();
        self.state().cursor = Some(cursor);
    }

    /// Insert a newly created item at the front.
    ///
    /// Returns `false` (and changes nothing) if the id is already present,
    /// so duplicate deliveries are harmless.
    pub fn apply_create(&self, item: ListItem) -> bool {
        let mut state = self.state();
        if state.items.contains_key(&item.id) {
            return false;
        }
        state.items.shift_insert(0, item.id.clone(), item);
        true
    }

    /// Replace an item in place, keeping its position.
    ///
    /// Returns `false` if the id is not present.
    pub fn apply_update(&self, item: ListItem) -> bool {
        let mut state = self.state();
        match state.items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove an item. Returns `false` if the id is not present.
    pub fn apply_delete(&self, id: &ItemId) -> bool {
        self.state().items.shift_remove(id).is_some()
    }

    /// Apply a realtime patch.
    pub fn apply_event(&self, event: ListEvent) -> bool {
        match event {
            ListEvent::Created(item) => self.apply_create(item),
            ListEvent::Updated(item) => self.apply_update(item),
            ListEvent::Deleted(id) => self.apply_delete(&id),
        }
    }

    /// A copy of the cached items in display order.
    pub fn snapshot(&self) -> Vec<ListItem> {
        self.state().items.values().cloned().collect()
    }

    /// The cached ids in display order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.state().items.keys().cloned().collect()
    }

    /// A copy of one cached item.
    pub fn get(&self, id: &ItemId) -> Option<ListItem> {
        self.state().items.get(id).cloned()
    }

    /// True if the id is cached.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.state().items.contains_key(id)
    }

    /// Number of cached items.
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// True until the source reports the last page.
    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    /// The cursor the next fetch resumes from.
    pub fn cursor(&self) -> Option<Cursor> {
        self.state().cursor.clone()
    }

    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().in_flight
    }

    /// The page size the next fetch will request.
    pub fn next_page_size(&self) -> u32 {
        self.sizer().next_size()
    }

    /// The command sent to the source.
    pub fn command(&self) -> &str {
        &self.command
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sizer(&self) -> MutexGuard<'_, AdaptivePageSizer> {
        self.sizer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S> std::fmt::Debug for PaginatedListCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("PaginatedListCache")
            .field("command", &self.command)
            .field("len", &state.items.len())
            .field("has_more", &state.has_more)
            .field("in_flight", &state.in_flight)
            .finish()
    }
}

/// Releases the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a> {
    state: &'a Mutex<CacheState>,
    epoch: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        // After a reset the flag belongs to the new epoch.
        if state.epoch == self.epoch {
            state.in_flight = false;
        }
    }
}
