//! Classified JSON-walking helpers.
//!
//! The engine consumes an already-parsed [`serde_json::Value`] tree and
//! crosses a parse-or-fail boundary exactly once per document: each helper
//! here either yields the typed value at the expected nesting level or the
//! error class the taxonomy assigns to its absence. Later stages never
//! re-examine raw JSON.

use acvp_core::error::{EngineError, EngineResult};
use serde_json::{Map, Value};

/// How the absence of an identifier is classified at its nesting level.
///
/// A group missing its own `tgId` cannot be referenced in any response, so
/// it is structurally fatal; an ordinary field missing at its level is a
/// recoverable-class defect that still aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// Absence makes the node unusable: classify as `MalformedInput`.
    Structural,
    /// Absence of an ordinary required field: classify as `MissingField`.
    Field,
}

/// Interprets a value as a JSON object.
///
/// # Errors
/// Returns [`EngineError::MalformedInput`] naming `what` if the value is
/// anything but an object.
pub fn as_object<'a>(value: &'a Value, what: &str) -> EngineResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| EngineError::MalformedInput(format!("{what} is not an object")))
}

/// Fetches a required, non-empty array field.
///
/// A field that is absent, of the wrong type, or empty all count as the
/// sequence being missing at this level.
///
/// # Errors
/// Returns [`EngineError::MissingField`] in each of those cases.
pub fn required_array<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> EngineResult<&'a Vec<Value>> {
    match obj.get(field).and_then(Value::as_array) {
        Some(array) if !array.is_empty() => Ok(array),
        _ => Err(EngineError::MissingField(field)),
    }
}

/// Fetches a required string field.
///
/// # Errors
/// Returns [`EngineError::MissingField`] if the field is absent or not a
/// string.
pub fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> EngineResult<&'a str> {
    obj.get(field).and_then(Value::as_str).ok_or(EngineError::MissingField(field))
}

/// Fetches a required unsigned integer field, classifying absence according
/// to `absence`.
///
/// # Errors
/// Returns [`EngineError::MalformedInput`] or [`EngineError::MissingField`]
/// per [`Absence`] if the field is absent or not an unsigned integer.
pub fn required_u64(
    obj: &Map<String, Value>,
    field: &'static str,
    absence: Absence,
) -> EngineResult<u64> {
    match obj.get(field).and_then(Value::as_u64) {
        Some(value) => Ok(value),
        None => Err(match absence {
            Absence::Structural => {
                EngineError::MalformedInput(format!("node is missing its '{field}' identifier"))
            }
            Absence::Field => EngineError::MissingField(field),
        }),
    }
}
