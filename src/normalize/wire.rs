//! Wire Object Accessors
//!
//! Lenient reads from a backend JSON object. Every accessor takes a list of
//! aliases (`&["due_date", "dueDate"]`); dotted aliases walk nested objects
//! (`"job.company"`). Nothing here fails: a wrong type reads as absent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::composite::{decode_delimited, decode_records, WireRecord};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Datetimes are cut down to their date part
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    format_datetime(&ts.naive_utc())
}

/// Read-only view over one wire entity
#[derive(Debug, Clone, Copy)]
pub struct WireObject<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> WireObject<'a> {
    pub fn new(payload: &'a Value, kind: &str) -> Self {
        match payload {
            Value::Object(map) => Self { map: Some(map) },
            other => {
                log::warn!("expected {} object on the wire, got {}", kind, type_name(other));
                Self { map: None }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.map_or(true, |m| m.is_empty())
    }

    fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut parts = path.split('.');
        let mut current = self.map?.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// First alias holding a non-null value
    pub fn field(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .filter_map(|alias| self.lookup(alias))
            .find(|v| !v.is_null())
    }

    /// Strings, with numbers and booleans stringified; blank reads as absent
    pub fn string(&self, aliases: &[&str]) -> Option<String> {
        let s = match self.field(aliases)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if s.trim().is_empty() {
            None
        } else {
            Some(s)
        }
    }

    pub fn text(&self, aliases: &[&str]) -> String {
        self.string(aliases).unwrap_or_default()
    }

    pub fn i64(&self, aliases: &[&str]) -> Option<i64> {
        match self.field(aliases)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn f64(&self, aliases: &[&str]) -> Option<f64> {
        let value: Option<f64> = match self.field(aliases)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        };
        value.filter(|f| f.is_finite())
    }

    pub fn bool(&self, aliases: &[&str]) -> Option<bool> {
        match self.field(aliases)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn datetime(&self, aliases: &[&str]) -> Option<NaiveDateTime> {
        self.field(aliases)?.as_str().and_then(parse_datetime)
    }

    pub fn date(&self, aliases: &[&str]) -> Option<NaiveDate> {
        self.field(aliases)?.as_str().and_then(parse_date)
    }

    pub fn timestamp(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        self.datetime(aliases).map(|dt| dt.and_utc())
    }

    /// Composite field of structured records
    pub fn records<R: WireRecord>(&self, aliases: &[&str]) -> Vec<R> {
        decode_records(self.field(aliases))
    }

    /// Composite field that may also be plain comma-separated text
    pub fn delimited(&self, aliases: &[&str]) -> Vec<String> {
        decode_delimited(self.field(aliases))
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Output side: builds the backend's snake_case object
#[derive(Debug, Default)]
pub struct WireWriter {
    map: Map<String, Value>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    /// `None` becomes JSON null
    pub fn put_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        self.map
            .insert(key.to_string(), value.map_or(Value::Null, Into::into));
        self
    }

    /// `None` leaves the key out (partial updates)
    pub fn put_some<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v.into());
        }
        self
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_resolve_in_order() {
        let payload = json!({"dueDate": "2025-03-01", "due_date": null});
        let obj = WireObject::new(&payload, "deadline");
        assert_eq!(
            obj.date(&["due_date", "dueDate"]),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn test_nested_paths() {
        let payload = json!({"job": {"company": "Acme", "title": "SRE"}});
        let obj = WireObject::new(&payload, "application");
        assert_eq!(obj.string(&["company_name", "job.company"]).as_deref(), Some("Acme"));
        assert_eq!(obj.string(&["job.missing"]), None);
    }

    #[test]
    fn test_numeric_coercion() {
        let payload = json!({"salary": "250,000", "job_id": "12", "count": 3.0, "flag": 1});
        let obj = WireObject::new(&payload, "offer");
        assert_eq!(obj.f64(&["salary"]), Some(250_000.0));
        assert_eq!(obj.i64(&["job_id"]), Some(12));
        assert_eq!(obj.i64(&["count"]), Some(3));
        assert_eq!(obj.bool(&["flag"]), Some(true));
    }

    #[test]
    fn test_non_object_payload_is_empty() {
        let payload = json!("not an object");
        let obj = WireObject::new(&payload, "job");
        assert!(obj.is_empty());
        assert_eq!(obj.text(&["title"]), "");
    }

    #[test]
    fn test_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(10, 30, 0));
        assert_eq!(parse_datetime("2025-03-01T10:30:00"), expected);
        assert_eq!(parse_datetime("2025-03-01T10:30:00Z"), expected);
        assert_eq!(parse_datetime("2025-03-01 10:30"), expected);
        assert_eq!(
            parse_datetime("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_datetime("soon"), None);
    }

    #[test]
    fn test_datetime_output_reparses() {
        let dt = parse_datetime("2025-03-01T10:30:00.250").unwrap();
        assert_eq!(parse_datetime(&format_datetime(&dt)), Some(dt));
        assert_eq!(format_datetime(&parse_datetime("2025-03-01T10:30:00").unwrap()), "2025-03-01T10:30:00");
    }

    #[test]
    fn test_writer_partial_and_null() {
        let mut w = WireWriter::new();
        w.put("title", "Reply").put_opt::<String>("notes", None).put_some::<bool>("completed", None);
        let out = w.finish();
        assert_eq!(out, json!({"title": "Reply", "notes": null}));
    }
}
