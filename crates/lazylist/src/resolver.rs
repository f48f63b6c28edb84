//! Lazy signed-URL resolution.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{StreamExt, stream};
use tracing::{debug, instrument, warn};

use lazylist_core::{
    AvatarFallbackGenerator, ItemId, ListItem, MediaKey, ObjectSigner, ResolvedMedia,
};

use crate::deadline::with_deadline;

/// Resolves an item's primary media into something renderable.
///
/// Signed URLs are cached by item id (not by key) for the lifetime of the
/// resolver. Items without media, and items whose signing fails, get a
/// placeholder avatar instead; resolution never surfaces an error.
pub struct SignedUrlResolver<G> {
    signer: G,
    avatars: AvatarFallbackGenerator,
    timeout: Duration,
    urls: Mutex<HashMap<ItemId, String>>,
}

impl<G: ObjectSigner> SignedUrlResolver<G> {
    /// Create a resolver with a per-call signing deadline.
    pub fn new(signer: G, timeout: Duration) -> Self {
        Self {
            signer,
            avatars: AvatarFallbackGenerator,
            timeout,
            urls: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve media for one item.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn resolve(
        &self,
        id: &ItemId,
        media_key: Option<&MediaKey>,
        display_name: &str,
    ) -> ResolvedMedia {
        if let Some(url) = self.cached(id) {
            return ResolvedMedia::Url(url);
        }

        let Some(key) = media_key else {
            return ResolvedMedia::Placeholder(self.avatars.generate(display_name));
        };

        match with_deadline(self.timeout, self.signer.sign(key)).await {
            Ok(url) => {
                debug!(key = %key, "signed media");
                self.urls().insert(id.clone(), url.clone());
                ResolvedMedia::Url(url)
            }
            Err(e) => {
                warn!(key = %key, reason = %e.reason(), error = %e, "signing failed, using placeholder");
                ResolvedMedia::Placeholder(self.avatars.generate(display_name))
            }
        }
    }

    /// Resolve an item's first media key, falling back to its name.
    pub async fn resolve_item(&self, item: &ListItem) -> ResolvedMedia {
        self.resolve(&item.id, item.primary_media(), item.fallback_name())
            .await
    }

    /// Resolve many items with at most `concurrency` signing calls in flight.
    ///
    /// Results come back in completion order.
    pub async fn resolve_many(
        &self,
        items: &[ListItem],
        concurrency: usize,
    ) -> Vec<(ItemId, ResolvedMedia)> {
        stream::iter(items)
            .map(|item| async move { (item.id.clone(), self.resolve_item(item).await) })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}

impl<G> SignedUrlResolver<G> {
    /// The underlying signer.
    pub fn signer(&self) -> &G {
        &self.signer
    }

    /// The cached URL for an item, if it was signed before.
    pub fn cached(&self, id: &ItemId) -> Option<String> {
        self.urls().get(id).cloned()
    }

    /// Drop the cached URL for one item.
    pub fn invalidate(&self, id: &ItemId) -> bool {
        self.urls().remove(id).is_some()
    }

    /// Drop every cached URL.
    pub fn clear(&self) {
        self.urls().clear();
    }

    /// Number of cached URLs.
    pub fn len(&self) -> usize {
        self.urls().len()
    }

    /// True if no URL is cached.
    pub fn is_empty(&self) -> bool {
        self.urls().is_empty()
    }

    fn urls(&self) -> MutexGuard<'_, HashMap<ItemId, String>> {
        self.urls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<G> std::fmt::Debug for SignedUrlResolver<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlResolver")
            .field("timeout", &self.timeout)
            .field("cached", &self.len())
            .finish()
    }
}
