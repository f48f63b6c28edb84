//! Per-screen list configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lazylist_core::error::{Error, InvalidInputError};

/// Bounds and steps for adaptive page sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizeConfig {
    /// Size of the first request.
    pub initial: u32,
    /// Smallest size ever requested (at least 1).
    pub min: u32,
    /// Largest size ever requested.
    pub max: u32,
    /// Growth after a fast response.
    pub grow_step: u32,
    /// Shrink after a slow response.
    pub shrink_step: u32,
    /// Responses faster than this grow the page.
    pub fast_ms: u64,
    /// Responses slower than this shrink the page.
    pub slow_ms: u64,
}

impl Default for PageSizeConfig {
    fn default() -> Self {
        Self {
            initial: 20,
            min: 5,
            max: 50,
            grow_step: 5,
            shrink_step: 2,
            fast_ms: 400,
            slow_ms: 1000,
        }
    }
}

impl PageSizeConfig {
    /// Fixed bounds with default steps; `initial` is clamped into them.
    pub fn bounded(initial: u32, min: u32, max: u32) -> Self {
        Self {
            initial,
            min,
            max,
            ..Self::default()
        }
    }

    /// Check the bounds.
    ///
    /// # Errors
    ///
    /// Returns a config error if `min` is zero, `min > max`, or the fast
    /// threshold is not below the slow one.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min == 0 {
            return Err(config_error("page_size.min must be at least 1"));
        }
        if self.min > self.max {
            return Err(config_error(format!(
                "page_size.min ({}) exceeds page_size.max ({})",
                self.min, self.max
            )));
        }
        if self.fast_ms >= self.slow_ms {
            return Err(config_error(format!(
                "page_size.fast_ms ({}) must be below page_size.slow_ms ({})",
                self.fast_ms, self.slow_ms
            )));
        }
        Ok(())
    }
}

/// Configuration for one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Command sent to the data source for pages.
    pub command: String,
    /// Command sent to the search source.
    pub search_command: String,
    /// Adaptive page sizing.
    pub page_size: PageSizeConfig,
    /// Deadline for every collaborator call.
    pub request_timeout_ms: u64,
    /// Quiet period before a typed query is sent.
    pub search_debounce_ms: u64,
    /// Signing requests allowed in flight at once.
    pub resolve_concurrency: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            command: "list".to_string(),
            search_command: "search".to_string(),
            page_size: PageSizeConfig::default(),
            request_timeout_ms: 10_000,
            search_debounce_ms: 300,
            resolve_concurrency: 5,
        }
    }
}

impl ListConfig {
    /// Default configuration for a pair of commands.
    pub fn for_commands(command: impl Into<String>, search_command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            search_command: search_command.into(),
            ..Self::default()
        }
    }

    /// Validate every field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.command.trim().is_empty() {
            return Err(config_error("command must be non-empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(config_error("request_timeout_ms must be positive"));
        }
        if self.resolve_concurrency == 0 {
            return Err(config_error("resolve_concurrency must be at least 1"));
        }
        self.page_size.validate()
    }

    /// Deadline for collaborator calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Search debounce window.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::InvalidInput(InvalidInputError::Config {
        message: message.into(),
    })
}
