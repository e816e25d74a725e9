//! Helpers for walking the normalized document tree.
//!
//! The CHB export omits the list wrapper when an element occurs exactly once,
//! so every collection read goes through [`as_list`].

use serde_json::{Map, Value};

/// Returns a collection field as a list regardless of its source shape.
///
/// A JSON array is returned element by element, anything else is treated as
/// a single entry. `null`, `""` and `{}` entries are dropped.
pub fn as_list(value: Option<&Value>) -> Vec<&Value> {
    let items: Vec<&Value> = match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };

    items.into_iter().filter(|v| !is_blank(v)).collect()
}

/// Follows `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(key))
}

/// Follows `path` starting from a field of `map`.
pub fn field<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    lookup(map.get(*first)?, rest)
}

/// Returns `true` for values that carry no data: `null`, `""` or `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Reads a finite number, accepting numbers or numeric strings.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
