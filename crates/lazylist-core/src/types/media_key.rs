//! Object storage key type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated object storage key.
///
/// Keys are opaque to lazylist; they are handed to an
/// [`ObjectSigner`](crate::ObjectSigner) to obtain a time-limited URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaKey(String);

impl MediaKey {
    /// Create a new media key, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank, starts with `/`, or contains
    /// control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Parse an optional key, treating blank strings as "no media".
    ///
    /// Payloads routinely carry `""` for items without an image.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, Error> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            Self::new(s).map(Some)
        }
    }

    /// Returns the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the final path segment of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.trim().is_empty() {
            return Err(InvalidInputError::MediaKey {
                value: s.to_string(),
                reason: "must be non-empty".to_string(),
            }
            .into());
        }

        if s.starts_with('/') {
            return Err(InvalidInputError::MediaKey {
                value: s.to_string(),
                reason: "must be relative (no leading '/')".to_string(),
            }
            .into());
        }

        if s.chars().any(char::is_control) {
            return Err(InvalidInputError::MediaKey {
                value: s.escape_debug().to_string(),
                reason: "must not contain control characters".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MediaKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MediaKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MediaKey> for String {
    fn from(key: MediaKey) -> Self {
        key.0
    }
}
