//! Decode-tolerant readers for loosely typed backend JSON.
//!
//! Nothing in here returns an error: a value of the wrong shape reads as absent
//! and the caller substitutes its default.

use std::borrow::Cow;

use serde_json::Value;

/// Decodes `value` if it is a string holding JSON, otherwise returns it as is.
/// A string that does not parse as JSON is returned unchanged.
pub fn decode_if_string(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            let looks_structured = trimmed.starts_with('{') || trimmed.starts_with('[');
            if looks_structured {
                if let Ok(decoded) = serde_json::from_str::<Value>(trimmed) {
                    return Cow::Owned(decoded);
                }
            }
            Cow::Borrowed(value)
        }
        _ => Cow::Borrowed(value),
    }
}

/// Reads a string field; numbers and booleans are stringified, anything else is `None`.
pub fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

pub fn text_or(value: &Value, key: &str, default: &str) -> String {
    text(value, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a number from a JSON number or from the leading number of a string
/// (`"85"`, `"85%"`, `"5.5 years"`). Missing or unparseable values yield 0.
pub fn number(value: &Value, key: &str) -> f64 {
    value.get(key).map(number_value).unwrap_or(0.0)
}

pub fn number_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => leading_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Reads a boolean; accepts `true`/`false`, `"true"`/`"yes"`, and non-zero numbers.
pub fn flag(value: &Value, key: &str) -> bool {
    match value.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Reads an array of strings; non-array values read as empty, non-string items are skipped.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .map(|v| string_list_value(&decode_if_string(v)))
        .unwrap_or_default()
}

pub fn string_list_value(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

/// Returns the array under the first present key, or the value itself when it
/// is already an array. Anything else reads as empty.
pub fn object_list<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    if let Some(arr) = value.as_array() {
        return arr.iter().filter(|v| v.is_object()).collect();
    }
    keys.iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_array()))
        .map(|arr| arr.iter().filter(|v| v.is_object()).collect())
        .unwrap_or_default()
}
