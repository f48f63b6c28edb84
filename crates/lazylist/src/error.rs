//! Errors surfaced by list and search operations.
//!
//! Both carry a [`FailureReason`] for the caller (toast, banner, retry
//! button) and the underlying [`Error`] for logs.

use thiserror::Error;

use lazylist_core::{Error, FailureReason};

/// A page fetch failed. Cache state is unchanged.
#[derive(Debug, Error)]
#[error("fetch failed ({reason}): {source}")]
pub struct FetchError {
    /// Why the fetch failed.
    pub reason: FailureReason,
    /// The underlying error.
    #[source]
    pub source: Error,
}

impl From<Error> for FetchError {
    fn from(source: Error) -> Self {
        Self {
            reason: source.reason(),
            source,
        }
    }
}

/// A search failed. The overlay shows the errored phase.
#[derive(Debug, Error)]
#[error("search failed ({reason}): {source}")]
pub struct SearchError {
    /// Why the search failed.
    pub reason: FailureReason,
    /// The underlying error.
    #[source]
    pub source: Error,
}

impl From<Error> for SearchError {
    fn from(source: Error) -> Self {
        Self {
            reason: source.reason(),
            source,
        }
    }
}
