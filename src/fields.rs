//! Field-access helpers over raw `serde_json::Value` records.
//!
//! Incoming records arrive as untyped JSON objects from an external parser,
//! so presence, identity and name extraction live here, shared by the
//! detector and the reference index.

use serde_json::Value;

/// True when a value counts as absent for required-field checks.
///
/// Numbers and booleans are always present, including `0` and `false`.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) | Value::Bool(_) => false,
    }
}

/// True when `record` carries a usable value under `field`.
pub fn has_field(record: &Value, field: &str) -> bool {
    record.get(field).map(|v| !is_empty(v)).unwrap_or(false)
}

/// The record's identifier as a string, if it carries one.
///
/// String and numeric ids are accepted; anything else is treated as no id.
pub fn id_of(record: &Value, id_field: &str) -> Option<String> {
    record.get(id_field).and_then(ref_value)
}

/// Lower-cased name/label for case-insensitive exact comparison.
pub fn name_key(record: &Value, name_field: &str) -> Option<String> {
    match record.get(name_field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_lowercase()),
        _ => None,
    }
}

/// String form of an identifier-valued field (string or number), if non-empty.
pub fn ref_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
