//! Endpoint base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Where a list lives: the base URL its page, search, and signer commands
/// hang off, or a `file://` directory holding a local store.
///
/// Commands are joined on as one more path segment, so
/// `https://api.example.com/dev` plus `getAllJobPosts` becomes
/// `https://api.example.com/dev/getAllJobPosts`. Plain `http` is accepted
/// only when the host is loopback.
///
/// ```
/// use lazylist_core::SourceUrl;
///
/// let api = SourceUrl::new("https://api.example.com/dev/").unwrap();
/// assert_eq!(api.endpoint("getAllJobPosts"),
///            "https://api.example.com/dev/getAllJobPosts");
///
/// let local = SourceUrl::new("file:///tmp/jobs").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceUrl(Url);

impl SourceUrl {
    /// Parses a list endpoint.
    ///
    /// Fails with [`InvalidInputError::SourceUrl`] when the text is not a
    /// URL, is relative, or names a scheme no list backend serves.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| rejected(s, format!("not a list endpoint URL: {}", e)))?;
        Self::check_backend(&url).map_err(|reason| rejected(s, reason))?;
        Ok(Self(url))
    }

    /// URL a command is posted to.
    pub fn endpoint(&self, command: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, command.trim_start_matches('/'))
    }

    /// Change-feed socket URL for a path below this endpoint.
    pub fn ws_url(&self, path: &str) -> String {
        let endpoint = self.endpoint(path);
        endpoint
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// True when the list is served from a directory on disk.
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// True when the list is served by a remote endpoint.
    pub fn is_network(&self) -> bool {
        matches!(self.0.scheme(), "http" | "https")
    }

    /// Store directory for a `file://` list, `None` for remote lists.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn check_backend(url: &Url) -> Result<(), String> {
        if url.cannot_be_a_base() {
            return Err("list endpoints need a base URL commands can be joined to".to_string());
        }

        match url.scheme() {
            "file" if url.path().is_empty() => {
                Err("a file:// list needs the store directory as its path".to_string())
            }
            "file" => Ok(()),
            "https" if url.host_str().is_none() => {
                Err("remote list endpoints need a host".to_string())
            }
            "https" => Ok(()),
            "http" if is_loopback(url) => Ok(()),
            "http" => Err("plain http list endpoints are only served from loopback".to_string()),
            other => Err(format!("no list backend serves the {}:// scheme", other)),
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|h| matches!(h, "localhost" | "127.0.0.1" | "[::1]"))
}

fn rejected(value: &str, reason: String) -> Error {
    InvalidInputError::SourceUrl {
        value: value.to_string(),
        reason,
    }
    .into()
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for SourceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SourceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
