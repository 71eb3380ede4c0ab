//! Reference-data lookup seam.
//!
//! A minority of transformers consult a reference table (e.g. the
//! document-type classification table) by stable identifier. The table is a
//! collaborator of this core; this module only defines the seam plus an
//! in-memory implementation for tests and dev.

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use thiserror::Error;

/// The lookup itself failed (backing store unreachable, etc.).
///
/// Distinct from `Ok(None)`, which means the key simply has no entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("reference data unavailable: {reason}")]
pub struct LookupError {
    pub reason: String,
}

impl LookupError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Keyed reference-data documents (id → JSON document).
pub trait ReferenceData: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Option<JsonValue>, LookupError>;
}

/// In-memory reference table.
#[derive(Debug, Default)]
pub struct InMemoryReferenceData {
    entries: HashMap<String, JsonValue>,
    unavailable: bool,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, doc: JsonValue) -> Self {
        self.entries.insert(key.into(), doc);
        self
    }

    /// A table that fails every fetch, for exercising lookup-failure paths.
    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            unavailable: true,
        }
    }
}

impl ReferenceData for InMemoryReferenceData {
    fn fetch(&self, key: &str) -> Result<Option<JsonValue>, LookupError> {
        if self.unavailable {
            return Err(LookupError::new("reference table offline"));
        }
        Ok(self.entries.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fetch_distinguishes_missing_from_unavailable() {
        let table = InMemoryReferenceData::new().with_entry("MG11", json!({"category": "WITNESS_STATEMENT"}));
        assert_eq!(
            table.fetch("MG11").unwrap(),
            Some(json!({"category": "WITNESS_STATEMENT"}))
        );
        assert_eq!(table.fetch("XX99").unwrap(), None);

        let offline = InMemoryReferenceData::unavailable();
        assert!(offline.fetch("MG11").is_err());
    }
}
