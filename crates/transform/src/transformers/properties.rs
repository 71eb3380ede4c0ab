//! Property-level combinators: rename, add, remove.
//!
//! These cover the long tail of one-field migrations without a bespoke
//! transformer type each. Identity and scoping come from the registration
//! site, so the same combinator serves both global migrations and
//! stream-scoped one-time patches.

use serde_json::{Map, Value as JsonValue};

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::path::{render, PathPattern};
use crate::rewrite::{any_node, rewrite};
use crate::scope::EventScope;
use crate::transformer::Transformer;

fn expect_object<'a>(
    node: &'a JsonValue,
    path: &crate::path::Path,
) -> Result<&'a Map<String, JsonValue>, TransformError> {
    match node {
        JsonValue::Object(map) => Ok(map),
        other => Err(TransformError::type_mismatch(render(path), "object", other)),
    }
}

/// Rename a key inside every object matched by the path pattern.
pub struct RenameProperty {
    id: &'static str,
    scope: EventScope,
    at: PathPattern,
    from: String,
    to: String,
}

impl RenameProperty {
    pub fn new(
        id: &'static str,
        scope: EventScope,
        at: PathPattern,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            id,
            scope,
            at,
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Transformer for RenameProperty {
    fn id(&self) -> &'static str {
        self.id
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        let needs_rename = any_node(envelope.payload(), self.at.matcher(), |node| {
            node.as_object()
                .is_some_and(|map| map.contains_key(&self.from) && !map.contains_key(&self.to))
        });
        if needs_rename {
            ActionKind::Transform
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = rewrite(envelope.payload(), self.at.matcher(), |path, node| {
            let map = expect_object(node, path)?;
            if !map.contains_key(&self.from) || map.contains_key(&self.to) {
                return Ok(node.clone());
            }
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                if *key == self.from {
                    out.insert(self.to.clone(), value.clone());
                } else {
                    out.insert(key.clone(), value.clone());
                }
            }
            Ok(JsonValue::Object(out))
        })?;
        Ok(Action::Transform(payload))
    }
}

/// Add a key (with a fixed default) to every matched object lacking it.
pub struct AddProperty {
    id: &'static str,
    scope: EventScope,
    at: PathPattern,
    key: String,
    value: JsonValue,
}

impl AddProperty {
    pub fn new(
        id: &'static str,
        scope: EventScope,
        at: PathPattern,
        key: impl Into<String>,
        value: JsonValue,
    ) -> Self {
        Self {
            id,
            scope,
            at,
            key: key.into(),
            value,
        }
    }
}

impl Transformer for AddProperty {
    fn id(&self) -> &'static str {
        self.id
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        let missing_somewhere = any_node(envelope.payload(), self.at.matcher(), |node| {
            node.as_object().is_some_and(|map| !map.contains_key(&self.key))
        });
        if missing_somewhere {
            ActionKind::Transform
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = rewrite(envelope.payload(), self.at.matcher(), |path, node| {
            let map = expect_object(node, path)?;
            if map.contains_key(&self.key) {
                return Ok(node.clone());
            }
            let mut out = map.clone();
            out.insert(self.key.clone(), self.value.clone());
            Ok(JsonValue::Object(out))
        })?;
        Ok(Action::Transform(payload))
    }
}

/// Remove a key from every matched object carrying it.
pub struct RemoveProperty {
    id: &'static str,
    scope: EventScope,
    at: PathPattern,
    key: String,
}

impl RemoveProperty {
    pub fn new(
        id: &'static str,
        scope: EventScope,
        at: PathPattern,
        key: impl Into<String>,
    ) -> Self {
        Self {
            id,
            scope,
            at,
            key: key.into(),
        }
    }
}

impl Transformer for RemoveProperty {
    fn id(&self) -> &'static str {
        self.id
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        let present_somewhere = any_node(envelope.payload(), self.at.matcher(), |node| {
            node.as_object().is_some_and(|map| map.contains_key(&self.key))
        });
        if present_somewhere {
            ActionKind::Transform
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = rewrite(envelope.payload(), self.at.matcher(), |path, node| {
            let map = expect_object(node, path)?;
            let mut out = map.clone();
            out.remove(&self.key);
            Ok(JsonValue::Object(out))
        })?;
        Ok(Action::Transform(payload))
    }
}
