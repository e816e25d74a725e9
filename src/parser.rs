//! XML normalizer for CHB exports.
//!
//! Turns the namespaced XML into a plain [`serde_json::Value`] tree: prefixes
//! are stripped, single children stay unwrapped, repeated children become
//! arrays, and leaf text is coerced to numbers and booleans where it parses.
//! String values and attribute values keep their whitespace as written.

use roxmltree::{Document, Node};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::Result;

/// Key under which an element's attributes are collected.
pub const ATTR_KEY: &str = "$";
/// Key under which text is kept when an element also has children or attributes.
pub const TEXT_KEY: &str = "_";

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Parses raw XML text into a namespace-free document tree.
///
/// The result is `{ "<root element>": <element> }`.
///
/// # Errors
///
/// Returns [`PipelineError::Parse`](crate::error::PipelineError::Parse) with
/// the parser's diagnostic if the text is not well-formed XML.
pub fn parse_document(xml: &str) -> Result<Value> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    debug!(
        root = root.tag_name().name(),
        nodes = doc.descendants().count(),
        "XML parsed"
    );

    let mut tree = Map::new();
    tree.insert(root.tag_name().name().to_string(), element_value(root));
    Ok(Value::Object(tree))
}

fn element_value(node: Node) -> Value {
    let mut map = Map::new();

    let attrs: Map<String, Value> = node
        .attributes()
        .map(|a| (a.name().to_string(), Value::String(a.value().to_string())))
        .collect();
    if !attrs.is_empty() {
        map.insert(ATTR_KEY.to_string(), Value::Object(attrs));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let name = child.tag_name().name().to_string();
            let value = element_value(child);
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    if map.is_empty() {
        return coerce(&text);
    }
    if !text.trim().is_empty() {
        map.insert(TEXT_KEY.to_string(), coerce(&text));
    }
    Value::Object(map)
}

/// Coerces a text value into a JSON scalar.
///
/// Integer and finite float forms become numbers (integral floats collapse to
/// integers), `true`/`false` in any case become booleans. Surrounding
/// whitespace is ignored for those checks only: whitespace-only text becomes
/// `""`, and any other string is kept exactly as written.
pub fn coerce(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }

    if let Some(n) = parse_float(trimmed) {
        return n;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    Value::String(text.to_string())
}

fn parse_float(text: &str) -> Option<Value> {
    // `f64::from_str` also accepts "inf" and "NaN"; only digit-bearing forms count.
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let f = text.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        return Some(Value::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number)
}
