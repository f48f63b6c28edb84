//! HTTP-backed object signer.

use async_trait::async_trait;
use tracing::instrument;

use lazylist_core::{MediaKey, ObjectSigner, Result};

use crate::client::HttpClient;
use crate::wire::{SignRequest, SignResponse};

/// Command used when none is configured.
pub const DEFAULT_SIGN_COMMAND: &str = "getObjectSignedUrl";

/// Turns storage keys into signed URLs via a POST endpoint.
#[derive(Debug, Clone)]
pub struct HttpObjectSigner {
    client: HttpClient,
    command: String,
}

impl HttpObjectSigner {
    /// Create a signer posting to `getObjectSignedUrl`.
    pub fn new(client: HttpClient) -> Self {
        Self::with_command(client, DEFAULT_SIGN_COMMAND)
    }

    /// Create a signer posting to a custom command.
    pub fn with_command(client: HttpClient, command: impl Into<String>) -> Self {
        Self {
            client,
            command: command.into(),
        }
    }
}

#[async_trait]
impl ObjectSigner for HttpObjectSigner {
    #[instrument(skip(self), fields(key = %key))]
    async fn sign(&self, key: &MediaKey) -> Result<String> {
        let request = SignRequest {
            command: &self.command,
            key: key.as_str(),
        };
        let response: SignResponse = self.client.post(&self.command, &request).await?;
        Ok(response.url)
    }
}
