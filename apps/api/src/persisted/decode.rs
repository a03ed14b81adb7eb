use std::borrow::Cow;

use serde_json::Value;

use crate::analysis::coerce::{decode_if_string, number_value};
use crate::analysis::slices::Experience;

/// Returns the first present, non-null field among `names`, decoded if it is
/// a string holding JSON.
pub fn field<'a>(record: &'a Value, names: &[&str]) -> Option<Cow<'a, Value>> {
    names
        .iter()
        .find_map(|name| record.get(*name).filter(|v| !v.is_null()))
        .map(decode_if_string)
}

/// Like `field`, but yields `Value::Null` when absent so slice normalizers
/// fall back to their defaults.
pub fn field_or_null<'a>(record: &'a Value, names: &[&str]) -> Cow<'a, Value> {
    field(record, names).unwrap_or(Cow::Owned(Value::Null))
}

/// Reads a years-of-experience figure: a number, a numeric string, text with a
/// leading number, or an object carrying one of the experience keys.
pub fn years(record: &Value, names: &[&str], pick: fn(&Experience) -> f64) -> f64 {
    match field(record, names) {
        Some(value) if value.is_object() => pick(&Experience::from_value(&value)),
        Some(value) => number_value(&value),
        None => 0.0,
    }
}
