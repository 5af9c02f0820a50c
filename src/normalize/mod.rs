//! Field Normalizer
//!
//! Maps entities to and from the backend's JSON shape. Reads accept either
//! naming convention and any composite encoding; writes always use the
//! backend's snake_case names and encoded-string composites.
//!
//! Both directions are total: malformed input degrades to empty values and
//! is logged, never returned as an error.

mod application;
mod composite;
mod deadline;
mod interview;
mod job;
mod offer;
mod resume;
mod wire;

#[cfg(test)]
mod tests;

use serde_json::Value;

pub use composite::{
    decode_delimited, decode_records, encode_delimited, encode_records, RawComposite, WireRecord,
};
pub use wire::{
    format_date, format_datetime, format_timestamp, parse_date, parse_datetime, WireObject,
    WireWriter,
};

/// Canonical entity <-> wire payload
pub trait WireCodec: Sized {
    fn to_wire(&self) -> Value;

    fn from_wire(payload: &Value) -> Self;
}

/// Request body for drafts and patches
pub trait WireBody {
    fn wire_body(&self) -> Value;
}

/// Decode a list response. Bare arrays and `{items|data|results: [...]}`
/// envelopes are accepted.
pub fn decode_list<T: WireCodec>(payload: &Value) -> Vec<T> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(map) => match ["items", "data", "results"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
        {
            Some(items) => items,
            None => {
                log::warn!("list response object has no item array");
                return Vec::new();
            }
        },
        Value::Null => return Vec::new(),
        other => {
            log::warn!("list response is a {}, expected an array", wire::type_name(other));
            return Vec::new();
        }
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .map(T::from_wire)
        .collect()
}
