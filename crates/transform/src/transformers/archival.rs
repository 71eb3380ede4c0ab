//! Archival-suffix redirect.
//!
//! A past release appended a suffix to the names of events it archived.
//! Projections read those events under their canonical names, so the suffix
//! is undone at read time; the stored records keep their suffixed names.

use casefold_events::{EventEnvelope, EventName};

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::scope::EventScope;
use crate::transformer::Transformer;

pub struct ArchivalSuffixRedirect {
    scope: EventScope,
    suffix: String,
}

impl ArchivalSuffixRedirect {
    /// `scope` lists the **canonical** (stripped) names this redirect owns.
    pub fn new(scope: EventScope, suffix: impl Into<String>) -> Self {
        Self {
            scope,
            suffix: suffix.into(),
        }
    }

    fn canonical_name(&self, envelope: &EventEnvelope) -> Option<EventName> {
        let stripped = envelope.name().strip_suffix_ignore_case(&self.suffix)?;
        if stripped.matches_any(self.scope.event_names().iter().map(String::as_str)) {
            Some(stripped)
        } else {
            None
        }
    }
}

impl Transformer for ArchivalSuffixRedirect {
    fn id(&self) -> &'static str {
        "archival-suffix-redirect"
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if self.canonical_name(envelope).is_some() && self.scope.admits_ignoring_name(envelope) {
            ActionKind::Redirect
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        match self.canonical_name(envelope) {
            Some(name) => Ok(Action::Redirect {
                name,
                payload: None,
            }),
            // classify contract: apply is never reached without a match.
            None => Ok(Action::NoAction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ScopeEntry;
    use casefold_core::{CausationId, CorrelationId, StreamId, UserId};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn transformer() -> ArchivalSuffixRedirect {
        ArchivalSuffixRedirect::new(
            EventScope::from_entry(&ScopeEntry::for_events(["case.opened", "case.bail-updated"])),
            "-archived",
        )
    }

    fn envelope(name: &str) -> EventEnvelope {
        EventEnvelope::new(
            Uuid::now_v7(),
            StreamId::new(),
            1,
            name,
            Utc::now(),
            CausationId::new(),
            CorrelationId::new(),
            UserId::new(),
            json!({"caseUrn": "X"}),
        )
    }

    #[test]
    fn suffixed_name_redirects_to_canonical_name() {
        let t = transformer();
        let env = envelope("case.opened-ARCHIVED");

        assert_eq!(t.classify(&env), ActionKind::Redirect);
        match t.apply(&env).unwrap() {
            Action::Redirect { name, payload } => {
                assert_eq!(name.as_str(), "case.opened");
                assert!(payload.is_none());
            }
            other => panic!("expected Redirect, got {other:?}"),
        }
    }

    #[test]
    fn canonical_names_are_not_redirected() {
        let t = transformer();
        assert_eq!(t.classify(&envelope("case.opened")), ActionKind::NoAction);
    }

    #[test]
    fn suffixed_names_outside_the_owned_set_are_ignored() {
        let t = transformer();
        assert_eq!(
            t.classify(&envelope("hearing.vacated-archived")),
            ActionKind::NoAction
        );
    }
}
