//! Report content returned by plugin runs
//!
//! A run may produce structured JSON, raw bytes, or a list mixing both.
//! Before it is stored, content is normalized into a single JSON value by
//! [`ReportContent::into_json`]: bytes become standard base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Output of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum ReportContent {
    Json(Value),
    Binary(Vec<u8>),
    List(Vec<ContentItem>),
}

/// One element of a list report
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
    File { name: String, data: Vec<u8> },
}

impl ReportContent {
    /// Normalize into the JSON value persisted as the report content
    pub fn into_json(self) -> Value {
        match self {
            ReportContent::Json(value) => value,
            ReportContent::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
            ReportContent::List(items) => {
                Value::Array(items.into_iter().map(ContentItem::into_json).collect())
            }
        }
    }
}

impl ContentItem {
    fn into_json(self) -> Value {
        match self {
            ContentItem::Json(value) => value,
            ContentItem::Text(text) => Value::String(text),
            ContentItem::Binary(data) | ContentItem::File { data, .. } => {
                Value::String(STANDARD.encode(data))
            }
        }
    }
}

impl From<Value> for ReportContent {
    fn from(value: Value) -> Self {
        ReportContent::Json(value)
    }
}
