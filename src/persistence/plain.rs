//! Plain-data extraction.
//!
//! Callers convert their state to plain JSON before handing it to the
//! manager. Fields whose names start with `_` or `$` are bookkeeping, not
//! state, and are dropped at every depth.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

#[must_use]
pub fn is_internal_field(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('$')
}

/// Recursively drop internal fields from objects (including objects nested in arrays).
#[must_use]
pub fn strip_internal_fields(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(name, _)| !is_internal_field(name))
                .map(|(name, value)| (name, strip_internal_fields(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(strip_internal_fields).collect())
        }
        other => other,
    }
}

/// Serialize `state` and strip internal fields.
pub fn to_plain<T: Serialize + ?Sized>(state: &T) -> Result<Value> {
    Ok(strip_internal_fields(serde_json::to_value(state)?))
}
