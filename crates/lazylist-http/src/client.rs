//! JSON-over-HTTP RPC client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use lazylist_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use lazylist_core::{Result, SourceUrl};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by endpoints on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// HTTP client for command-style POST endpoints.
///
/// Every command is `POST {base}/{command}` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: SourceUrl,
}

impl HttpClient {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(base: SourceUrl) -> Result<Self> {
        Self::build(base, None)
    }

    /// Create a client that sends `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn with_token(base: SourceUrl, token: &str) -> Result<Self> {
        Self::build(base, Some(token))
    }

    fn build(base: SourceUrl, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                InvalidInputError::Other {
                    message: "token contains invalid header characters".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("lazylist/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, base })
    }

    /// Returns the base URL this client posts to.
    pub fn base(&self) -> &SourceUrl {
        &self.base
    }

    /// Post a command and decode the JSON response.
    #[instrument(skip(self, body), fields(base = %self.base))]
    pub async fn post<B, R>(&self, command: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(command);
        debug!(command, %url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "response");

        if !status.is_success() {
            return Err(Error::Protocol(parse_error_response(response).await));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::malformed(format!("response body: {e}")))
    }
}

async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => ProtocolError::new(status, body.error, body.message),
        Err(_) => ProtocolError::new(status, None, None),
    }
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}
