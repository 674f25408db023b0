//! Field-type-aware value extraction
//!
//! Each semantic type has its own wire shape (an expanded person carries
//! `Title`, a lookup carries its target field, a hyperlink carries `Url` and
//! `Description`, ...). Extraction is dispatched strictly on the declared
//! field kind, never on what the value happens to look like. Absent or
//! malformed values degrade to empty or raw text; formatting never fails.

use crate::config::FormatConfig;
use crate::types::{FieldDescriptor, FieldKind, RawRecord, SelectedField, SemanticType};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::Value;
use std::fmt::Write;

/// Separator between the entries of multi-value fields
const MULTI_VALUE_SEPARATOR: &str = "; ";

/// Turns raw record values into display strings
#[derive(Clone, Debug)]
pub struct ValueFormatter {
    datetime_pattern: String,
    offset: FixedOffset,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(&FormatConfig::default())
    }
}

impl ValueFormatter {
    /// Create a formatter; an out-of-range offset falls back to UTC
    pub fn new(config: &FormatConfig) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self {
            datetime_pattern: config.datetime_pattern.clone(),
            offset,
        }
    }

    /// Display string of `field` in `record`
    pub fn format(&self, field: &FieldDescriptor, record: &RawRecord) -> String {
        let value = record.get(&field.internal_name);
        match &field.kind {
            FieldKind::PersonOrGroup => each_entry(value, |v| key_text(v, "Title")),
            FieldKind::Lookup { target_field } => each_entry(value, |v| key_text(v, target_field)),
            FieldKind::Taxonomy => each_entry(value, |v| key_text(v, "Label")),
            FieldKind::Url => value.map(url_anchor).unwrap_or_default(),
            FieldKind::DateTime => self.datetime_text(value),
            FieldKind::PlainText
            | FieldKind::Computed
            | FieldKind::MultiLineText
            | FieldKind::Other => scalar_text(value),
        }
    }

    /// Display string of a value of a row the host already has selected
    ///
    /// Person and lookup values arrive as arrays there; only the first entry
    /// is shown. Hyperlinks arrive as the bare URL.
    pub fn format_selected(&self, field: &SelectedField, value: &Value) -> String {
        match field.semantic_type {
            SemanticType::PersonOrGroup => first_entry(value)
                .map(|v| key_text(v, "title"))
                .unwrap_or_default(),
            SemanticType::Lookup => first_entry(value)
                .map(|v| key_text(v, "lookupValue"))
                .unwrap_or_default(),
            SemanticType::Taxonomy => key_text(value, "Label"),
            SemanticType::Url => url_anchor(value),
            SemanticType::DateTime => self.datetime_text(Some(value)),
            SemanticType::PlainText
            | SemanticType::Computed
            | SemanticType::MultiLineText
            | SemanticType::Other => scalar_text(Some(value)),
        }
    }

    fn datetime_text(&self, value: Option<&Value>) -> String {
        let raw = match value {
            Some(Value::String(s)) => s,
            other => return scalar_text(other),
        };

        let Ok(instant) = DateTime::parse_from_rfc3339(raw) else {
            return raw.clone();
        };

        let local = instant.with_timezone(&self.offset);
        let mut text = String::new();
        // An invalid pattern surfaces as a fmt error rather than a panic
        if write!(text, "{}", local.format(&self.datetime_pattern)).is_err() {
            return local.to_rfc3339();
        }
        text
    }
}

/// Raw text of a record's value, with no type dispatch
pub(crate) fn raw_text(record: &RawRecord, name: &str) -> String {
    scalar_text(record.get(name))
}

/// Raw scalar passthrough; null and absent become empty
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| scalar_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        Some(obj @ Value::Object(_)) => obj.to_string(),
    }
}

/// Look a key up in an object, falling back to a case-insensitive match
fn get_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    let obj = value.as_object()?;
    obj.get(key).or_else(|| {
        obj.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn key_text(value: &Value, key: &str) -> String {
    scalar_text(get_key(value, key))
}

/// Apply `extract` to a single value or to every entry of a multi-value field
fn each_entry(value: Option<&Value>, extract: impl Fn(&Value) -> String) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        // verbose multi-value shape: {"results": [...]}
        Some(v) if get_key(v, "results").is_some_and(Value::is_array) => {
            each_entry(get_key(v, "results"), extract)
        }
        Some(Value::Array(values)) => values
            .iter()
            .map(&extract)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        Some(v) => extract(v),
    }
}

fn first_entry(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(values) => values.first(),
        Value::Null => None,
        other => Some(other),
    }
}

/// Anchor for a hyperlink value; the URL doubles as text without a description
fn url_anchor(value: &Value) -> String {
    let (url, description) = match value {
        Value::String(url) => (url.clone(), String::new()),
        Value::Object(_) => (key_text(value, "Url"), key_text(value, "Description")),
        Value::Null => return String::new(),
        other => return scalar_text(Some(other)),
    };

    if url.is_empty() {
        return description;
    }
    let text = if description.is_empty() { &url } else { &description };
    format!("<a href=\"{}\" style=\"cursor:pointer;\">{}</a>", url, text)
}
