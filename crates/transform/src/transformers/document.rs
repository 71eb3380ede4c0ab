//! Document-type classification enrichment.
//!
//! Old document events carry only a raw type identifier. The current schema
//! also carries the category from the document-type classification table, so
//! replay enriches historical events via the reference-data lookup.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::lookup::ReferenceData;
use crate::scope::EventScope;
use crate::transformer::Transformer;

const TYPE_ID_FIELD: &str = "documentTypeId";
const CATEGORY_FIELD: &str = "documentCategory";

pub struct DocumentTypeClassifier {
    scope: EventScope,
    reference: Arc<dyn ReferenceData>,
}

impl DocumentTypeClassifier {
    pub fn new(scope: EventScope, reference: Arc<dyn ReferenceData>) -> Self {
        Self { scope, reference }
    }
}

impl Transformer for DocumentTypeClassifier {
    fn id(&self) -> &'static str {
        "document-type-classifier"
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        if envelope.payload().get(CATEGORY_FIELD).is_some() {
            return ActionKind::NoAction;
        }
        ActionKind::Transform
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = envelope.payload();

        let type_id = match payload.get(TYPE_ID_FIELD) {
            None => return Err(TransformError::missing_field("", TYPE_ID_FIELD)),
            Some(JsonValue::String(s)) => s.as_str(),
            Some(other) => {
                return Err(TransformError::type_mismatch(TYPE_ID_FIELD, "string", other))
            }
        };

        let entry = self
            .reference
            .fetch(type_id)
            .map_err(|e| TransformError::lookup(type_id, e.reason))?
            .ok_or_else(|| TransformError::lookup(type_id, "no such document type"))?;

        let category = entry
            .get("category")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TransformError::lookup(type_id, "entry has no category"))?;

        let mut out = payload.clone();
        out[CATEGORY_FIELD] = json!(category);
        Ok(Action::Transform(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::InMemoryReferenceData;
    use crate::manifest::ScopeEntry;
    use casefold_core::{CausationId, CorrelationId, StreamId, UserId};
    use chrono::Utc;
    use uuid::Uuid;

    fn scope() -> EventScope {
        EventScope::from_entry(&ScopeEntry::for_events(["case.document.received"]))
    }

    fn envelope(payload: JsonValue) -> EventEnvelope {
        EventEnvelope::new(
            Uuid::now_v7(),
            StreamId::new(),
            5,
            "case.document.received",
            Utc::now(),
            CausationId::new(),
            CorrelationId::new(),
            UserId::new(),
            payload,
        )
    }

    fn table() -> Arc<InMemoryReferenceData> {
        Arc::new(
            InMemoryReferenceData::new()
                .with_entry("MG11", json!({"category": "WITNESS_STATEMENT"})),
        )
    }

    #[test]
    fn category_is_added_from_the_reference_table() {
        let t = DocumentTypeClassifier::new(scope(), table());
        let env = envelope(json!({"documentId": "d1", "documentTypeId": "MG11"}));

        assert_eq!(t.classify(&env), ActionKind::Transform);
        let Action::Transform(payload) = t.apply(&env).unwrap() else {
            panic!("expected Transform");
        };
        assert_eq!(payload["documentCategory"], "WITNESS_STATEMENT");
    }

    #[test]
    fn already_classified_documents_are_skipped() {
        let t = DocumentTypeClassifier::new(scope(), table());
        let env = envelope(json!({
            "documentTypeId": "MG11",
            "documentCategory": "WITNESS_STATEMENT",
        }));
        assert_eq!(t.classify(&env), ActionKind::NoAction);
    }

    #[test]
    fn unknown_type_id_is_a_lookup_failure() {
        let t = DocumentTypeClassifier::new(scope(), table());
        let env = envelope(json!({"documentTypeId": "XX99"}));

        let err = t.apply(&env).unwrap_err();
        match err {
            TransformError::Lookup { key, reason } => {
                assert_eq!(key, "XX99");
                assert!(reason.contains("no such document type"));
            }
            other => panic!("expected Lookup, got {other:?}"),
        }
    }

    #[test]
    fn unavailable_table_is_a_lookup_failure_not_a_no_op() {
        let t = DocumentTypeClassifier::new(scope(), Arc::new(InMemoryReferenceData::unavailable()));
        let env = envelope(json!({"documentTypeId": "MG11"}));

        assert_eq!(t.classify(&env), ActionKind::Transform);
        assert!(matches!(
            t.apply(&env).unwrap_err(),
            TransformError::Lookup { .. }
        ));
    }

    #[test]
    fn missing_type_id_is_a_missing_field() {
        let t = DocumentTypeClassifier::new(scope(), table());
        let env = envelope(json!({"documentId": "d1"}));
        assert!(matches!(
            t.apply(&env).unwrap_err(),
            TransformError::MissingField { field: "documentTypeId", .. }
        ));
    }
}
