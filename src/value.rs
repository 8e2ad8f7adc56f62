//! Value coercion: JSON when it parses, the raw text otherwise.

use serde_json::Value;

/// A decoded annotation value.
///
/// `Null | Bool | Number | String | Array | Object`; object keys keep the
/// order they were written in.
pub type AnnotationValue = Value;

/// Decode the text that follows a tag key.
///
/// ```text
/// ""            -> null
/// "null"        -> null
/// "30"          -> 30
/// "[\"a\"]"     -> ["a"]
/// "Alice"       -> "Alice"
/// ```
pub fn parse_value(raw: &str) -> AnnotationValue {
    if raw.is_empty() || raw == "null" {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(raw) {
        // " null" and friends decode to null; keep the text instead
        Ok(Value::Null) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

/// Name of a value's JSON type, for diagnostics.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
