//! Composite Field Codec
//!
//! The backend stores composite fields as TEXT columns, and depending on the
//! code path that wrote them they come back as:
//!
//! - a native JSON array,
//! - a JSON-encoded string of an array,
//! - a JSON-encoded string of an object keyed `"0"`, `"1"`, ... (legacy
//!   corruption of an array),
//! - for skills and tags, plain comma-separated text.
//!
//! Decoding classifies the raw value first, then turns every form into a
//! plain `Vec`. Encoding always emits the encoded-string form.

use serde_json::{Map, Value};

use super::wire::type_name;
use crate::domain::{ChecklistItem, CompositeRecord, NegotiationEntry};

/// Encoded strings are unwrapped at most this many times
const MAX_ENCODING_DEPTH: usize = 2;

/// A composite record that can be read from and written to JSON
pub trait WireRecord: CompositeRecord + Sized {
    /// `None` when the value is not a record of this type at all
    fn from_value(value: &Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

/// Physical form of a composite field as received
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawComposite<'a> {
    Absent,
    Sequence(&'a [Value]),
    Encoded(&'a str),
    IndexedObject(&'a Map<String, Value>),
    Unsupported(&'a Value),
}

impl<'a> RawComposite<'a> {
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawComposite::Absent,
            Some(Value::String(s)) if s.trim().is_empty() => RawComposite::Absent,
            Some(Value::String(s)) => RawComposite::Encoded(s),
            Some(Value::Array(items)) => RawComposite::Sequence(items),
            Some(Value::Object(map)) => RawComposite::IndexedObject(map),
            Some(other) => RawComposite::Unsupported(other),
        }
    }
}

/// Object values in numeric key order; non-numeric keys follow, sorted
fn indexed_values(map: &Map<String, Value>) -> Vec<&Value> {
    let mut entries: Vec<(Option<u64>, &String, &Value)> = map
        .iter()
        .map(|(k, v)| (k.trim().parse::<u64>().ok(), k, v))
        .collect();
    entries.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(b.1),
    });
    entries.into_iter().map(|(_, _, v)| v).collect()
}

fn collect_records<'v, R: WireRecord>(values: impl IntoIterator<Item = &'v Value>) -> Vec<R> {
    values.into_iter().filter_map(R::from_value).collect()
}

fn decode_at_depth<R: WireRecord>(raw: RawComposite<'_>, depth: usize) -> Vec<R> {
    match raw {
        RawComposite::Absent => Vec::new(),
        RawComposite::Sequence(items) => collect_records(items),
        RawComposite::IndexedObject(map) => collect_records(indexed_values(map)),
        RawComposite::Encoded(text) => {
            if depth >= MAX_ENCODING_DEPTH {
                log::warn!("composite field nested too deeply in encoded strings");
                return Vec::new();
            }
            match serde_json::from_str::<Value>(text) {
                Ok(decoded) => match RawComposite::classify(Some(&decoded)) {
                    RawComposite::Unsupported(v) => {
                        log::warn!("composite field decoded to a {}, treating as empty", type_name(v));
                        Vec::new()
                    }
                    inner => decode_at_depth(inner, depth + 1),
                },
                Err(e) => {
                    log::warn!("composite field is not valid JSON ({}), treating as empty", e);
                    Vec::new()
                }
            }
        }
        RawComposite::Unsupported(v) => {
            log::warn!("composite field is a {}, treating as empty", type_name(v));
            Vec::new()
        }
    }
}

/// Decode any received form into the canonical sequence
pub fn decode_records<R: WireRecord>(value: Option<&Value>) -> Vec<R> {
    decode_at_depth(RawComposite::classify(value), 0)
}

/// Drop blank records and emit the encoded-string form
pub fn encode_records<R: WireRecord>(records: &[R]) -> Value {
    let kept: Vec<Value> = records
        .iter()
        .filter(|r| r.is_valid())
        .map(R::to_value)
        .collect();
    Value::String(Value::Array(kept).to_string())
}

/// Like `decode_records::<String>`, but every record is comma text: pieces
/// are split out and trimmed, blanks dropped
pub fn decode_delimited(value: Option<&Value>) -> Vec<String> {
    let records = match value {
        Some(Value::String(text)) if !looks_structured(text) => vec![text.clone()],
        _ => decode_records::<String>(value),
    };
    records.iter().flat_map(|r| split_delimited(r)).collect()
}

fn looks_structured(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('[') || trimmed.starts_with('{') || trimmed.starts_with('"')
}

fn split_delimited(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Comma-joined text, blanks removed
pub fn encode_delimited(values: &[String]) -> Value {
    let joined = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    Value::String(joined)
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_bool(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|k| match obj.get(*k)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            Value::String(s) => Some(s.eq_ignore_ascii_case("true")),
            _ => None,
        })
        .unwrap_or(false)
}

impl WireRecord for ChecklistItem {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(ChecklistItem {
                task: first_text(obj, &["task", "description", "text", "title"]).unwrap_or_default(),
                completed: first_bool(obj, &["completed", "done", "checked"]),
            }),
            Value::String(s) => Some(ChecklistItem::new(s.clone())),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        serde_json::json!({ "task": self.task, "completed": self.completed })
    }
}

impl WireRecord for NegotiationEntry {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(NegotiationEntry {
            date: first_text(obj, &["date", "created_at", "createdAt"]).unwrap_or_default(),
            proposal: first_text(obj, &["proposal", "offer", "amount", "note", "notes"]).unwrap_or_default(),
        })
    }

    fn to_value(&self) -> Value {
        serde_json::json!({ "date": self.date, "proposal": self.proposal })
    }
}

impl WireRecord for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => first_text(obj, &["name", "label", "value", "benefit"]),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}
