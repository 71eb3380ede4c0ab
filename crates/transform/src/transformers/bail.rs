//! Bail-status enum expansion.
//!
//! The original two-value remand vocabulary was expanded when conditional
//! and unconditional bail were split. Historical values map onto the
//! expanded vocabulary; unknown values surface as errors rather than being
//! coerced.

use serde_json::{json, Value as JsonValue};

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::path::{render, PathPattern};
use crate::rewrite::{any_node, rewrite};
use crate::scope::EventScope;
use crate::transformer::Transformer;

/// Where the per-defendant bail status lives inside the payload.
pub const BAIL_STATUS_PATH: &str = "defendants.#.bailStatus";

fn expand(legacy: &str) -> Option<&'static str> {
    match legacy {
        "REMANDED" => Some("REMANDED_IN_CUSTODY"),
        "BAILED" => Some("CONDITIONAL_BAIL"),
        _ => None,
    }
}

fn is_current(value: &str) -> bool {
    matches!(
        value,
        "REMANDED_IN_CUSTODY" | "CONDITIONAL_BAIL" | "UNCONDITIONAL_BAIL"
    )
}

pub struct BailStatusExpansion {
    scope: EventScope,
    at: PathPattern,
}

impl BailStatusExpansion {
    pub fn new(scope: EventScope) -> Self {
        Self {
            scope,
            at: PathPattern::parse(BAIL_STATUS_PATH),
        }
    }
}

impl Transformer for BailStatusExpansion {
    fn id(&self) -> &'static str {
        "bail-status-expansion"
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        let legacy_left = any_node(envelope.payload(), self.at.matcher(), |v| {
            v.as_str().is_some_and(|s| expand(s).is_some())
        });
        if legacy_left {
            ActionKind::Transform
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = rewrite(envelope.payload(), self.at.matcher(), |path, node| {
            let value = match node {
                JsonValue::String(s) => s,
                other => return Err(TransformError::type_mismatch(render(path), "string", other)),
            };

            if let Some(expanded) = expand(value) {
                return Ok(json!(expanded));
            }
            if is_current(value) {
                return Ok(node.clone());
            }
            Err(TransformError::type_mismatch(
                render(path),
                "known bail status",
                node,
            ))
        })?;

        Ok(Action::Transform(payload))
    }
}
