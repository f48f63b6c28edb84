//! File-backed object signer.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use lazylist_core::error::{Error, InvalidInputError};
use lazylist_core::{MediaKey, ObjectSigner, Result};

use crate::store::{FileStore, map_io};

/// Default lifetime of a signed URL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Signs media keys as `file://` URLs with an `expires` query parameter.
///
/// Keys without a stored object fail with a 404 protocol error, the same
/// way a remote signer reports a missing object.
#[derive(Debug, Clone)]
pub struct FileObjectSigner {
    store: FileStore,
    ttl: Duration,
}

impl FileObjectSigner {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[async_trait]
impl ObjectSigner for FileObjectSigner {
    #[instrument(skip(self), fields(key = %key))]
    async fn sign(&self, key: &MediaKey) -> Result<String> {
        let path = self.store.require_media(key)?;
        let path = std::fs::canonicalize(&path).map_err(map_io)?;

        let mut url = Url::from_file_path(&path).map_err(|_| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("not an absolute path: {}", path.display()),
            })
        })?;

        let expires = (SystemTime::now() + self.ttl)
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string());

        Ok(url.into())
    }
}
