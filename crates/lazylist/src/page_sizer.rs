//! Latency-driven page sizing.

use std::time::Duration;

use tracing::trace;

use crate::config::PageSizeConfig;

/// Adjusts the next page size from the latency of completed fetches.
///
/// Fast responses grow the page, slow ones shrink it, anything in between
/// leaves it alone. The size always stays within `[min, max]`. This is a
/// heuristic: it only affects the *next* request.
#[derive(Debug, Clone)]
pub struct AdaptivePageSizer {
    config: PageSizeConfig,
    current: u32,
}

impl AdaptivePageSizer {
    /// Create a sizer. The initial size is clamped into the bounds.
    ///
    /// Bounds are expected to be validated; a zero `min` is treated as 1
    /// and an inverted range collapses to `max`.
    pub fn new(config: PageSizeConfig) -> Self {
        let mut config = config;
        config.min = config.min.max(1);
        config.max = config.max.max(config.min);
        let current = config.initial.clamp(config.min, config.max);
        Self { config, current }
    }

    /// The size to request next.
    pub fn next_size(&self) -> u32 {
        self.current
    }

    /// The configured `(min, max)` bounds.
    pub fn bounds(&self) -> (u32, u32) {
        (self.config.min, self.config.max)
    }

    /// Record the wall-clock duration of a completed fetch.
    pub fn observe(&mut self, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let previous = self.current;

        if elapsed_ms < self.config.fast_ms {
            self.current = self
                .current
                .saturating_add(self.config.grow_step)
                .min(self.config.max);
        } else if elapsed_ms > self.config.slow_ms {
            self.current = self
                .current
                .saturating_sub(self.config.shrink_step)
                .max(self.config.min);
        }

        trace!(elapsed_ms, previous, next = self.current, "page size observed");
    }
}
