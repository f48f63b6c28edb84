//! Request and response bodies for list, search and signing commands.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lazylist_core::{Cursor, Error, ItemSchema, Page, Result, SearchQuery};

/// Body of a list request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListRequest<'a> {
    pub command: &'a str,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<&'a Value>,
}

/// Body of a search request: the command, the text, and each filter as a
/// top-level field.
pub(crate) fn search_request(command: &str, query: &SearchQuery) -> Value {
    let mut body = Map::new();
    for (field, value) in &query.filters {
        body.insert(field.clone(), value.clone());
    }
    body.insert("command".to_string(), Value::String(command.to_string()));
    body.insert(
        "searchQuery".to_string(),
        Value::String(query.text.trim().to_string()),
    );
    Value::Object(body)
}

/// Body of a signing request.
#[derive(Debug, Serialize)]
pub(crate) struct SignRequest<'a> {
    pub command: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignResponse {
    #[serde(alias = "data")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    response: Vec<Value>,
    #[serde(default)]
    last_evaluated_key: Value,
    count: Option<u64>,
}

/// Decode a list or search response into a page.
///
/// The list may sit at the top level or inside a `data` envelope.
pub(crate) fn parse_page(schema: &ItemSchema, body: Value) -> Result<Page> {
    let body = match body {
        Value::Object(mut fields) if !fields.contains_key("response") => {
            match fields.remove("data") {
                Some(inner @ Value::Object(_)) => inner,
                _ => return Err(Error::malformed("missing 'response' array")),
            }
        }
        other => other,
    };

    let parsed: ListResponse = serde_json::from_value(body)
        .map_err(|e| Error::malformed(format!("list response: {e}")))?;

    let items = schema.parse_all(parsed.response)?;
    let mut page = Page::new(items, Cursor::from_value(parsed.last_evaluated_key));
    if let Some(count) = parsed.count {
        page = page.with_count(count);
    }
    Ok(page)
}
