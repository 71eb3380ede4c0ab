//! Retirement of noise events.
//!
//! Some historical event names carry no information under the current
//! vocabulary (sync pings, duplicated notifications). They are dropped from
//! every rebuilt projection so the normalized stream only contains names the
//! fold knows. The durable log keeps them.

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::scope::EventScope;
use crate::transformer::Transformer;

pub struct RetiredEventDeactivation {
    scope: EventScope,
}

impl RetiredEventDeactivation {
    pub fn new(scope: EventScope) -> Self {
        Self { scope }
    }
}

impl Transformer for RetiredEventDeactivation {
    fn id(&self) -> &'static str {
        "retired-event-deactivation"
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if self.scope.admits(envelope) {
            ActionKind::Deactivate
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, _envelope: &EventEnvelope) -> Result<Action, TransformError> {
        Ok(Action::Deactivate)
    }
}
