//! Object signer trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::MediaKey;

/// Turns a storage key into a time-limited viewable URL.
#[async_trait]
pub trait ObjectSigner: Send + Sync {
    /// Sign a key.
    async fn sign(&self, key: &MediaKey) -> Result<String>;
}

#[async_trait]
impl<T: ObjectSigner + ?Sized> ObjectSigner for std::sync::Arc<T> {
    async fn sign(&self, key: &MediaKey) -> Result<String> {
        (**self).sign(key).await
    }
}
