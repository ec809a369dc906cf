// src/utils/serialization.rs
//! Serialization utilities for signed tokens.
//!
//! Provides:
//! - Canonical JSON encoding (sorted object keys, no whitespace)
//! - Unpadded URL-safe base64 for compact token segments

use serde::Serialize;
use serde_json::Value;

/// Serializes a value to canonical JSON bytes.
///
/// Object keys are sorted at every depth, so the same logical payload always
/// encodes to the same bytes regardless of struct field order or of how
/// `serde_json` orders its maps.
///
/// # Returns
/// - `Ok(Vec<u8>)` with the canonical encoding on success
/// - `Err(serde_json::Error)` if the value cannot be represented as JSON
pub fn to_canonical_json<T: Serialize>(data: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = sort_keys(serde_json::to_value(data)?);
    serde_json::to_vec(&value)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Encodes bytes as an unpadded URL-safe base64 segment.
pub fn encode_segment(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

/// Decodes an unpadded URL-safe base64 segment.
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::decode_config(segment, base64::URL_SAFE_NO_PAD)
}

/// Decodes a base64url segment holding a JSON document.
pub fn decode_json_segment(segment: &str) -> Result<Value, String> {
    let bytes = decode_segment(segment).map_err(|e| format!("base64 decoding failed: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("JSON decoding failed: {}", e))
}
