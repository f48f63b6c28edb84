//! A list screen's view model.
//!
//! [`ListScreen`] owns everything one screen needs: the paginated cache, the
//! search overlay, lazy media resolution driven by visibility, and an
//! optional realtime subscription. Dropping the screen tears all of it down.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use lazylist_core::{
    DataSource, Error, EventSource, ItemId, ListItem, ObjectSigner, ResolvedMedia, SearchQuery,
    SearchSource,
};

use crate::cache::{FetchOutcome, PaginatedListCache};
use crate::config::ListConfig;
use crate::error::{FetchError, SearchError};
use crate::resolver::SignedUrlResolver;
use crate::search::{SearchOutcome, SearchOverlayCache};
use crate::subscription::{PatchSubscription, subscribe_patches};
use crate::visibility::VisibilityTracker;

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub item: ListItem,
    /// `None` until the row has been visible and resolved.
    pub media: Option<ResolvedMedia>,
}

/// View model for a paginated, searchable list.
pub struct ListScreen<S, Q, G> {
    cache: Arc<PaginatedListCache<S>>,
    overlay: SearchOverlayCache<Q>,
    resolver: SignedUrlResolver<G>,
    tracker: Mutex<VisibilityTracker>,
    media: Mutex<HashMap<ItemId, ResolvedMedia>>,
    resolve_concurrency: usize,
    patches: Mutex<Option<PatchSubscription>>,
}

impl<S, Q, G> ListScreen<S, Q, G>
where
    S: DataSource + 'static,
    Q: SearchSource + 'static,
    G: ObjectSigner,
{
    /// Build a screen over its collaborators.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` does not validate.
    pub fn new(source: S, search: Q, signer: G, config: &ListConfig) -> Result<Self, Error> {
        Ok(Self {
            cache: Arc::new(PaginatedListCache::new(source, config)?),
            overlay: SearchOverlayCache::new(search, config)?,
            resolver: SignedUrlResolver::new(signer, config.request_timeout()),
            tracker: Mutex::new(VisibilityTracker::new()),
            media: Mutex::new(HashMap::new()),
            resolve_concurrency: config.resolve_concurrency,
            patches: Mutex::new(None),
        })
    }

    /// Load the next page (end-of-list reached).
    pub async fn load_more(&self) -> Result<FetchOutcome, FetchError> {
        self.cache.fetch_next().await
    }

    /// Start over from the first page (pull to refresh).
    ///
    /// Resolved media is kept: ids are stable across refreshes.
    pub async fn refresh(&self) -> Result<FetchOutcome, FetchError> {
        self.cache.reset();
        self.cache.fetch_next().await
    }

    /// Handle a viewability change and resolve media for newly seen rows.
    ///
    /// Returns what was resolved by this call. Ids never seen before are
    /// resolved at most once for the lifetime of the screen.
    pub async fn on_viewable_items_changed(
        &self,
        visible: &[ItemId],
    ) -> Vec<(ItemId, ResolvedMedia)> {
        let fresh = self.tracker().on_viewable_items_changed(visible);
        if fresh.is_empty() {
            return Vec::new();
        }

        let items = self.lookup(&fresh);
        if items.len() < fresh.len() {
            // Rows reported before their item arrived can be requested again.
            let mut tracker = self.tracker();
            for id in &fresh {
                if !items.iter().any(|item| &item.id == id) {
                    tracker.forget(id);
                }
            }
        }

        let resolved = self
            .resolver
            .resolve_many(&items, self.resolve_concurrency)
            .await;
        debug!(requested = fresh.len(), resolved = resolved.len(), "visible media resolved");

        let mut media = self.media();
        for (id, value) in &resolved {
            media.insert(id.clone(), value.clone());
        }
        resolved
    }

    /// Run a search now, skipping the debounce window.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchOutcome, SearchError> {
        self.overlay.search(query).await
    }

    /// Feed a keystroke to the debounced search.
    pub fn search_input(&self, query: SearchQuery) {
        self.overlay.input(query);
    }

    /// Subscribe the cache to realtime patches, replacing any earlier
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the source refuses the subscription.
    pub fn attach_realtime<E>(&self, source: &E) -> Result<(), Error>
    where
        E: EventSource,
        E::Stream: 'static,
    {
        let sub = subscribe_patches(self.cache.clone(), source)?;
        *self.patches.lock().unwrap_or_else(|e| e.into_inner()) = Some(sub);
        Ok(())
    }
}

impl<S, Q, G> ListScreen<S, Q, G> {
    /// The rows currently shown: search results while the overlay is
    /// active, the paginated list otherwise.
    pub fn rows(&self) -> Vec<Row> {
        let items = if self.overlay.is_active() {
            self.overlay.snapshot().items
        } else {
            self.cache.snapshot()
        };
        let media = self.media();
        items
            .into_iter()
            .map(|item| {
                let media = media.get(&item.id).cloned();
                Row { item, media }
            })
            .collect()
    }

    /// Resolved media for one row.
    pub fn media_for(&self, id: &ItemId) -> Option<ResolvedMedia> {
        self.media().get(id).cloned()
    }

    /// Turn the search overlay off.
    pub fn clear_search(&self) {
        self.overlay.clear();
    }

    /// Stop applying realtime patches.
    pub fn detach_realtime(&self) {
        self.patches.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// True while a realtime subscription is running.
    pub fn is_live(&self) -> bool {
        self.patches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|sub| !sub.is_finished())
    }

    /// The paginated cache.
    pub fn cache(&self) -> &PaginatedListCache<S> {
        &self.cache
    }

    /// The search overlay.
    pub fn overlay(&self) -> &SearchOverlayCache<Q> {
        &self.overlay
    }

    /// The media resolver.
    pub fn resolver(&self) -> &SignedUrlResolver<G> {
        &self.resolver
    }

    fn lookup(&self, ids: &[ItemId]) -> Vec<ListItem> {
        let search = self.overlay.snapshot().items;
        ids.iter()
            .filter_map(|id| {
                search
                    .iter()
                    .find(|item| &item.id == id)
                    .cloned()
                    .or_else(|| self.cache.get(id))
            })
            .collect()
    }

    fn tracker(&self) -> MutexGuard<'_, VisibilityTracker> {
        self.tracker.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn media(&self) -> MutexGuard<'_, HashMap<ItemId, ResolvedMedia>> {
        self.media.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S, Q, G> std::fmt::Debug for ListScreen<S, Q, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListScreen")
            .field("cache", &self.cache)
            .field("overlay", &self.overlay)
            .field("media", &self.media().len())
            .finish_non_exhaustive()
    }
}
