//! Error taxonomy of the transformation pipeline.
//!
//! A [`TransformError`] is fatal for the single event being transformed, not
//! for the whole replay run. It must never be swallowed into a no-op: a
//! silently ignored shape violation would corrupt a rebuilt projection
//! undetectably.

use serde_json::Value as JsonValue;
use thiserror::Error;

use casefold_core::StreamId;

/// Failure inside a single transformer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A transform's type assumption about a node was violated
    /// (e.g. expected Bool, found String). Signals a malformed legacy shape
    /// that must not be silently coerced.
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// A field the transform relies on is absent from the matched node.
    #[error("missing field '{field}' at '{path}'")]
    MissingField { path: String, field: &'static str },

    /// Reference data was unavailable or had no entry for the key.
    /// Fatal for this transform; retry policy belongs to the caller.
    #[error("reference lookup failed for '{key}': {reason}")]
    Lookup { key: String, reason: String },
}

impl TransformError {
    pub fn type_mismatch(path: impl Into<String>, expected: &'static str, found: &JsonValue) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            found: json_kind(found).to_string(),
        }
    }

    pub fn missing_field(path: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            path: path.into(),
            field,
        }
    }

    pub fn lookup(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Lookup {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Variant name of a JSON value, for error messages.
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// A [`TransformError`] contextualized by the registry with everything the
/// replay driver needs to triage without re-deriving state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transformer '{transformer}' failed on stream {stream_id} at version {version}: {source}")]
pub struct PipelineError {
    pub transformer: &'static str,
    pub stream_id: StreamId,
    pub version: u64,
    #[source]
    pub source: TransformError,
}
