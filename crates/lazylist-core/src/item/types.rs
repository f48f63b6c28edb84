//! List item and page types.

use serde::{Deserialize, Serialize};

use crate::types::{Cursor, ItemId, MediaKey};

/// A record shown in a list.
///
/// Only the id, media keys, and display name are interpreted; everything
/// else the server sent is kept verbatim in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// The identity of this item.
    pub id: ItemId,

    /// Storage keys for attached media, in server order.
    #[serde(default)]
    pub media_keys: Vec<MediaKey>,

    /// Name used to generate a placeholder avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The original payload object.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ListItem {
    /// Create an item with no media and no extra fields.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            media_keys: Vec::new(),
            display_name: None,
            fields: serde_json::Map::new(),
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Append a media key.
    pub fn with_media(mut self, key: MediaKey) -> Self {
        self.media_keys.push(key);
        self
    }

    /// Set a domain field.
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The key whose media represents this item (the first one).
    pub fn primary_media(&self) -> Option<&MediaKey> {
        self.media_keys.first()
    }

    /// The name used for placeholders, falling back to the id.
    pub fn fallback_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// One batch of items returned by a list or search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The items in server order.
    pub items: Vec<ListItem>,

    /// Where the next page resumes, if the server has more.
    pub cursor: Option<Cursor>,

    /// Server-reported total. Informational only.
    pub count: Option<u64>,
}

impl Page {
    /// Create a page.
    pub fn new(items: Vec<ListItem>, cursor: Option<Cursor>) -> Self {
        Self {
            items,
            cursor,
            count: None,
        }
    }

    /// Set the server-reported count.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// True when the server signalled there is nothing after this page.
    pub fn is_last(&self) -> bool {
        self.cursor.is_none() || self.items.is_empty()
    }
}

/// A generated stand-in for missing media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    /// One or two uppercase letters.
    pub initials: String,
    /// Background color as `#rrggbb`.
    pub background_color: String,
    /// Text color as `#rrggbb`.
    pub text_color: String,
}

/// What a row renders for its primary media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedMedia {
    /// A signed, time-limited URL.
    Url(String),
    /// A generated avatar.
    Placeholder(Placeholder),
}

impl ResolvedMedia {
    /// Returns the URL if media was resolved.
    pub fn url(&self) -> Option<&str> {
        match self {
            ResolvedMedia::Url(url) => Some(url),
            ResolvedMedia::Placeholder(_) => None,
        }
    }

    /// Returns true if this is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResolvedMedia::Placeholder(_))
    }
}
