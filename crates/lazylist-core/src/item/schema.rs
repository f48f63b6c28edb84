//! Mapping between untyped payload objects and [`ListItem`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EventKind, ListEvent, ListItem, RawListEvent};
use crate::Result;
use crate::error::Error;
use crate::types::{ItemId, MediaKey};

/// Field names used to read items out of endpoint payloads.
///
/// Each resource type names its id differently (`post_id`, `product_id`,
/// `company_id`, ...), so the schema is part of every source's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSchema {
    /// Field holding the item id (string or integer).
    pub id_field: String,

    /// Field holding the media key(s): a string, an array of strings, or null.
    pub media_field: String,

    /// Candidate fields for the display name, tried in order.
    pub name_fields: Vec<String>,
}

impl Default for ItemSchema {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            media_field: "fileKey".to_string(),
            name_fields: vec![
                "name".to_string(),
                "company_name".to_string(),
                "title".to_string(),
                "author".to_string(),
            ],
        }
    }
}

impl ItemSchema {
    /// Schema with a custom id field and the default media and name fields.
    pub fn with_id_field(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            ..Self::default()
        }
    }

    /// Set the media field.
    pub fn media_field(mut self, field: impl Into<String>) -> Self {
        self.media_field = field.into();
        self
    }

    /// Parse one payload object into an item.
    ///
    /// # Errors
    ///
    /// Returns a malformed-payload protocol error if the value is not an
    /// object, the id is missing or invalid, or the media field has an
    /// unexpected shape.
    pub fn parse(&self, value: Value) -> Result<ListItem> {
        let Value::Object(fields) = value else {
            return Err(Error::malformed("item is not a JSON object"));
        };

        let id = self.read_id(&fields)?;
        let media_keys = self.read_media(&fields)?;
        let display_name = self
            .name_fields
            .iter()
            .filter_map(|name| fields.get(name).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ListItem {
            id,
            media_keys,
            display_name,
            fields,
        })
    }

    /// Parse a batch of payload objects, failing on the first bad one.
    pub fn parse_all(&self, values: Vec<Value>) -> Result<Vec<ListItem>> {
        values.into_iter().map(|v| self.parse(v)).collect()
    }

    /// Read an id from either a bare value or an object carrying the id field.
    pub fn parse_id(&self, value: &Value) -> Result<ItemId> {
        match value {
            Value::Object(fields) => self.read_id(fields),
            other => id_from_scalar(other)
                .ok_or_else(|| Error::malformed("id must be a string or integer")),
        }
    }

    /// Convert a raw realtime event into a typed patch.
    pub fn parse_event(&self, raw: RawListEvent) -> Result<ListEvent> {
        Ok(match raw.kind {
            EventKind::Created => ListEvent::Created(self.parse(raw.payload)?),
            EventKind::Updated => ListEvent::Updated(self.parse(raw.payload)?),
            EventKind::Deleted => ListEvent::Deleted(self.parse_id(&raw.payload)?),
        })
    }

    /// Render an item back into a payload object using this schema's field names.
    pub fn to_value(&self, item: &ListItem) -> Value {
        let mut fields = item.fields.clone();
        fields.insert(
            self.id_field.clone(),
            Value::String(item.id.as_str().to_string()),
        );

        match item.media_keys.as_slice() {
            [] => {}
            [single] if !fields.get(&self.media_field).is_some_and(Value::is_array) => {
                fields.insert(
                    self.media_field.clone(),
                    Value::String(single.as_str().to_string()),
                );
            }
            keys => {
                let keys = keys
                    .iter()
                    .map(|k| Value::String(k.as_str().to_string()))
                    .collect();
                fields.insert(self.media_field.clone(), Value::Array(keys));
            }
        }

        if let (Some(name), Some(field)) = (&item.display_name, self.name_fields.first())
            && !self.name_fields.iter().any(|f| fields.contains_key(f))
        {
            fields.insert(field.clone(), Value::String(name.clone()));
        }

        Value::Object(fields)
    }

    fn read_id(&self, fields: &serde_json::Map<String, Value>) -> Result<ItemId> {
        let raw = fields
            .get(&self.id_field)
            .ok_or_else(|| Error::malformed(format!("missing id field '{}'", self.id_field)))?;

        id_from_scalar(raw).ok_or_else(|| {
            Error::malformed(format!(
                "id field '{}' must be a non-empty string or integer",
                self.id_field
            ))
        })
    }

    fn read_media(&self, fields: &serde_json::Map<String, Value>) -> Result<Vec<MediaKey>> {
        match fields.get(&self.media_field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(MediaKey::parse_optional(s)
                .map_err(|e| Error::malformed(e.to_string()))?
                .into_iter()
                .collect()),
            Some(Value::Array(values)) => {
                let mut keys = Vec::with_capacity(values.len());
                for value in values {
                    let Some(s) = value.as_str() else {
                        return Err(Error::malformed(format!(
                            "media field '{}' must contain strings",
                            self.media_field
                        )));
                    };
                    if let Some(key) =
                        MediaKey::parse_optional(s).map_err(|e| Error::malformed(e.to_string()))?
                    {
                        keys.push(key);
                    }
                }
                Ok(keys)
            }
            Some(_) => Err(Error::malformed(format!(
                "media field '{}' must be a string or an array",
                self.media_field
            ))),
        }
    }
}

fn id_from_scalar(value: &Value) -> Option<ItemId> {
    match value {
        Value::String(s) => ItemId::new(s.as_str()).ok(),
        Value::Number(n) => ItemId::new(n.to_string()).ok(),
        _ => None,
    }
}
