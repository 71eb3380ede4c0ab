//! The 4-way migration decision for one envelope.

use serde_json::Value as JsonValue;

use casefold_events::EventName;

/// What the pipeline should do with an envelope at read time.
///
/// None of these touch the durable log. DEACTIVATE drops the event from
/// every future read-time projection; REDIRECT renames the effective event
/// name seen downstream and may simultaneously replace the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NoAction,
    Transform(JsonValue),
    Deactivate,
    Redirect {
        name: EventName,
        payload: Option<JsonValue>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::NoAction => ActionKind::NoAction,
            Action::Transform(_) => ActionKind::Transform,
            Action::Deactivate => ActionKind::Deactivate,
            Action::Redirect { .. } => ActionKind::Redirect,
        }
    }
}

/// Payload-free discriminant of [`Action`], returned by classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionKind {
    NoAction,
    Transform,
    Deactivate,
    Redirect,
}

impl ActionKind {
    pub fn is_no_action(self) -> bool {
        matches!(self, ActionKind::NoAction)
    }
}
