//! Filesystem storage for the file-backed collaborators.
//!
//! Layout under the root directory:
//!
//! ```text
//! items/<id>.json   one payload object per item
//! media/<key>       media objects addressed by storage key
//! events.jsonl      append-only realtime log
//! events.lock       guards appends to the log
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use lazylist_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use lazylist_core::{
    Cursor, EventKind, ItemId, ItemSchema, ListItem, MediaKey, Page, RawListEvent, Result,
    SearchQuery,
};

pub(crate) fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::Http {
        message: format!("IO error: {}", err),
    })
}

fn map_json(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// One line of the realtime log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique id of this log entry.
    pub seq: String,
    /// ISO 8601 timestamp.
    pub time: String,
    /// The event as delivered to subscribers.
    #[serde(flatten)]
    pub event: RawListEvent,
}

/// Filesystem-backed item store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    schema: ItemSchema,
}

impl FileStore {
    /// Open a store at `root` using the default item schema.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_schema(root, ItemSchema::default())
    }

    /// Open a store whose payloads follow `schema`.
    pub fn with_schema(root: impl AsRef<Path>, schema: ItemSchema) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            schema,
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The schema payloads are parsed with.
    pub fn schema(&self) -> &ItemSchema {
        &self.schema
    }

    fn items_dir(&self) -> PathBuf {
        self.root.join("items")
    }

    fn item_path(&self, id: &ItemId) -> PathBuf {
        self.items_dir().join(format!("{}.json", encode_file_name(id.as_str())))
    }

    /// Path of the media object for a key.
    pub fn media_path(&self, key: &MediaKey) -> PathBuf {
        self.root.join("media").join(key.as_str())
    }

    /// Get the realtime log path.
    pub fn events_path(&self) -> PathBuf {
        self.root.join("events.jsonl")
    }

    fn events_lock_path(&self) -> PathBuf {
        self.root.join("events.lock")
    }

    /// Append an event to the realtime log under an exclusive lock.
    fn append_event(&self, kind: EventKind, payload: Value) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.events_lock_path())
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;

        let entry = LogEntry {
            seq: Uuid::new_v4().to_string(),
            time: Utc::now().to_rfc3339(),
            event: RawListEvent { kind, payload },
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path())
            .map_err(map_io)?;

        let line = serde_json::to_string(&entry).map_err(map_json)?;
        writeln!(file, "{}", line).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;

        lock_file.unlock().map_err(map_io)?;

        Ok(())
    }

    // ========================================================================
    // Item Operations
    // ========================================================================

    /// Create or replace an item, logging `created` or `updated`.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub fn put_item(&self, item: &ListItem) -> Result<EventKind> {
        let path = self.item_path(&item.id);
        let kind = if path.exists() {
            EventKind::Updated
        } else {
            EventKind::Created
        };

        fs::create_dir_all(self.items_dir()).map_err(map_io)?;

        let payload = self.schema.to_value(item);
        let content = serde_json::to_string_pretty(&payload).map_err(map_json)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, &path).map_err(map_io)?;

        self.append_event(kind, payload)?;

        debug!(kind = kind.as_str(), "Stored item");

        Ok(kind)
    }

    /// Parse a payload object and store it.
    pub fn put_value(&self, value: Value) -> Result<(ListItem, EventKind)> {
        let item = self.schema.parse(value)?;
        let kind = self.put_item(&item)?;
        Ok((item, kind))
    }

    /// Read one item.
    pub fn get_item(&self, id: &ItemId) -> Result<Option<ListItem>> {
        let path = self.item_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(map_io)?;
        let value: Value = serde_json::from_str(&content).map_err(map_json)?;
        Ok(Some(self.schema.parse(value)?))
    }

    /// Delete an item, logging `deleted`. Returns false if it did not exist.
    #[instrument(skip(self), fields(id = %id))]
    pub fn delete_item(&self, id: &ItemId) -> Result<bool> {
        let path = self.item_path(id);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(map_io)?;
        self.append_event(EventKind::Deleted, Value::String(id.as_str().to_string()))?;

        debug!("Deleted item");

        Ok(true)
    }

    /// Every stored item, ordered by id.
    pub fn all_items(&self) -> Result<Vec<ListItem>> {
        let dir = self.items_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(&dir).map_err(map_io)? {
            let path = entry.map_err(map_io)?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let content = fs::read_to_string(&path).map_err(map_io)?;
            let parsed = serde_json::from_str::<Value>(&content)
                .map_err(map_json)
                .and_then(|value| self.schema.parse(value));
            match parsed {
                Ok(item) => items.push(item),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable item"),
            }
        }

        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    /// One page of items in id order, starting after `cursor`.
    ///
    /// A full page carries its last id as the cursor; a short page carries
    /// none.
    #[instrument(skip(self))]
    pub fn list(&self, limit: u32, cursor: Option<&str>) -> Result<Page> {
        let items = self.all_items()?;
        let total = items.len() as u64;
        let limit = limit as usize;

        let page: Vec<ListItem> = items
            .into_iter()
            .filter(|item| cursor.is_none_or(|after| item.id.as_str() > after))
            .take(limit)
            .collect();

        let cursor = if limit > 0 && page.len() == limit {
            page.last().map(|item| Cursor::token(item.id.as_str()))
        } else {
            None
        };

        Ok(Page::new(page, cursor).with_count(total))
    }

    /// Items matching a query.
    ///
    /// Text matches case-insensitively against the display name and every
    /// string field; each filter must equal the item's field exactly.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<ListItem>> {
        let needle = query.text.trim().to_lowercase();
        Ok(self
            .all_items()?
            .into_iter()
            .filter(|item| needle.is_empty() || text_matches(item, &needle))
            .filter(|item| {
                query.filters.iter().all(|(field, expected)| {
                    expected.is_null()
                        || expected.as_str().is_some_and(|s| s.trim().is_empty())
                        || item.fields.get(field) == Some(expected)
                })
            })
            .collect())
    }

    // ========================================================================
    // Media
    // ========================================================================

    fn checked_media_path(&self, key: &MediaKey) -> Result<PathBuf> {
        if key.as_str().split('/').any(|segment| segment == "..") {
            return Err(Error::InvalidInput(InvalidInputError::MediaKey {
                value: key.as_str().to_string(),
                reason: "must stay inside the media directory".to_string(),
            }));
        }
        Ok(self.media_path(key))
    }

    /// Store a media object under a key.
    pub fn put_media(&self, key: &MediaKey, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.checked_media_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }
        fs::write(&path, bytes).map_err(map_io)?;
        Ok(path)
    }

    /// Check that a media object exists.
    ///
    /// # Errors
    ///
    /// Returns a 404 protocol error if it does not.
    pub fn require_media(&self, key: &MediaKey) -> Result<PathBuf> {
        let path = self.checked_media_path(key)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::Protocol(ProtocolError::new(
                404,
                Some("NoSuchKey".to_string()),
                Some(format!("media {} not found", key)),
            )))
        }
    }
}

fn text_matches(item: &ListItem, needle: &str) -> bool {
    item.display_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle))
        || item
            .fields
            .values()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(needle))
}

/// Make an id safe as a file name on every platform.
fn encode_file_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
