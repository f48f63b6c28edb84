//! Pagination cursor type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque pagination cursor.
///
/// Servers return either a plain token or a structured key object
/// (`lastEvaluatedKey`), so the cursor keeps the raw JSON and hands it
/// back untouched on the next request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(serde_json::Value);

impl Cursor {
    /// Wrap a raw JSON cursor.
    ///
    /// Returns `None` for `null`, which servers use to signal the last page.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(ref s) if s.is_empty() => None,
            other => Some(Self(other)),
        }
    }

    /// Create a cursor from a plain string token.
    pub fn token(s: impl Into<String>) -> Self {
        Self(serde_json::Value::String(s.into()))
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Returns the token if this cursor is a plain string.
    pub fn as_token(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}
