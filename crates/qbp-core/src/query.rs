//! # Query Serializer
//!
//! Flattens a JSON object into the query-string dialect the hosted checkout
//! page reads: nested objects become `parent[child]=value`, arrays become
//! `parent[0]=value`. Traversal follows insertion order.
//!
//! Values are emitted verbatim. Fields that may contain reserved characters
//! (a redirect URL, for instance) must be percent-encoded by the caller
//! before they are placed in the object.

use serde_json::Value;

use crate::error::QbpError;

/// Flatten `value` into `key=value` segments.
///
/// # Errors
///
/// `InvalidInput` when `value` is not a JSON object.
pub fn segments(value: &Value) -> Result<Vec<String>, QbpError> {
    let Value::Object(map) = value else {
        return Err(QbpError::InvalidInput(format!(
            "query parameters must be an object, got {}",
            kind(value)
        )));
    };

    let mut out = Vec::with_capacity(map.len());
    for (key, child) in map {
        push_segments(key, child, &mut out);
    }
    Ok(out)
}

/// Flatten `value` and join the segments with `&`.
pub fn stringify(value: &Value) -> Result<String, QbpError> {
    segments(value).map(|s| s.join("&"))
}

fn push_segments(key: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (child_key, child) in map {
                push_segments(&format!("{key}[{child_key}]"), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                push_segments(&format!("{key}[{index}]"), child, out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push(format!("{key}={s}")),
        Value::Bool(b) => out.push(format!("{key}={b}")),
        Value::Number(n) => out.push(format!("{key}={n}")),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
