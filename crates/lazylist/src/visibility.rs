//! Tracking which visible rows still need media.

use std::collections::HashSet;

use lazylist_core::ItemId;

/// Remembers every id whose media was requested and reports only new ones.
///
/// There is no eviction: an id that scrolls out and back in is never
/// requested twice for the lifetime of the tracker.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    requested: HashSet<ItemId>,
}

impl VisibilityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a viewability change.
    ///
    /// Returns the visible ids that were never requested before, in the
    /// order given, and marks them as in flight.
    pub fn on_viewable_items_changed<'a, I>(&mut self, visible: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        visible
            .into_iter()
            .filter(|id| self.requested.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Record an id resolved through another path.
    pub fn mark_resolved(&mut self, id: ItemId) {
        self.requested.insert(id);
    }

    /// Allow an id to be requested again.
    ///
    /// Used when a row was visible before its item was known.
    pub fn forget(&mut self, id: &ItemId) -> bool {
        self.requested.remove(id)
    }

    /// True if the id was requested (or resolved) already.
    pub fn is_requested(&self, id: &ItemId) -> bool {
        self.requested.contains(id)
    }

    /// Number of ids tracked.
    pub fn len(&self) -> usize {
        self.requested.len()
    }

    /// True if nothing was requested yet.
    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }
}
