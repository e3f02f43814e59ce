//! JSON document codec.
//!
//! # Responsibility
//! - Serialize the full document to its durable/interchange JSON form.
//! - Parse external JSON into a validated staging document.
//!
//! # Invariants
//! - The top-level shape is checked first: `comments` must be a map. Payloads
//!   failing that check are rejected as a whole.
//! - Decoded documents pass `Document::validate()` before being returned.

use super::{CodecError, CodecResult};
use crate::model::comment::Document;
use serde_json::Value;

/// Serializes the whole document, pretty-printed for hand inspection.
pub fn encode_document(document: &Document) -> CodecResult<String> {
    serde_json::to_string_pretty(document)
        .map_err(|err| CodecError::InvalidFormat(format!("serialization failed: {err}")))
}

/// Parses and validates an external JSON payload into a staging document.
pub fn decode_document(payload: &str) -> CodecResult<Document> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| CodecError::InvalidFormat(format!("not valid JSON: {err}")))?;

    let root = value
        .as_object()
        .ok_or_else(|| CodecError::InvalidFormat("top level must be an object".to_string()))?;
    match root.get("comments") {
        Some(Value::Object(_)) => {}
        Some(_) => {
            return Err(CodecError::InvalidFormat(
                "`comments` must be a map of scene keys to comment lists".to_string(),
            ))
        }
        None => {
            return Err(CodecError::InvalidFormat(
                "missing `comments` map".to_string(),
            ))
        }
    }

    let mut document: Document = serde_json::from_value(value)
        .map_err(|err| CodecError::InvalidFormat(format!("schema mismatch: {err}")))?;
    document.normalize();
    document
        .validate()
        .map_err(|err| CodecError::InvalidFormat(err.to_string()))?;
    Ok(document)
}
