//! Deadlines for collaborator calls.

use std::future::Future;
use std::time::Duration;

use lazylist_core::Result;
use lazylist_core::error::TransportError;

/// Run `fut` with a deadline.
///
/// On expiry the future is dropped, which cancels the underlying request,
/// and a timeout transport error is returned.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            duration_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
        .into()),
    }
}
