//! Canonical JSON used as the input to signing and hashing (§4.1).
//!
//! Keys are sorted lexicographically at every object level, independent
//! of whatever map representation `serde_json` happens to be built with
//! (the `preserve_order` feature elsewhere in the dependency graph would
//! otherwise make iteration order insertion-dependent), integers and
//! floats stay distinguished, and the output carries no insignificant
//! whitespace.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Recursively rebuilds every object in `value` as a key-sorted map.
/// Arrays, scalars, and `null` pass through unchanged (order within an
/// array is significant and preserved).
fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&str, Value> =
                map.iter().map(|(k, v)| (k.as_str(), normalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

/// Returns canonical JSON bytes for any serializable payload.
pub fn to_canonical_bytes<T: Serialize>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(payload)?;
    let normalized = normalize(&value);
    serde_json::to_vec(&normalized)
}

/// Returns canonical JSON bytes for an already-constructed [`Value`].
pub fn value_to_canonical_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(&normalize(value)).expect("canonical Value always serializes")
}
