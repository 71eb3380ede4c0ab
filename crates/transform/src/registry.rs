//! Ordered transformer registry driving the replay-time pipeline.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::PipelineError;
use crate::transformer::Transformer;

/// Composition discipline of one registration group.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GroupDiscipline {
    /// First non-NoAction match wins; application stops within the group.
    /// Used for one-shot migrations (retirements, redirects).
    Exclusive,
    /// Every matching transformer is applied in priority order, each
    /// receiving the previous transformer's output. Used when several
    /// orthogonal reshapes target the same event name.
    Layered,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registration targets undeclared group '{0}'")]
    UnknownGroup(String),

    #[error("group '{0}' declared more than once")]
    DuplicateGroup(String),
}

struct Registration {
    priority: u32,
    transformer: Arc<dyn Transformer>,
}

struct Group {
    name: String,
    discipline: GroupDiscipline,
    registrations: Vec<Registration>,
}

/// Builds a [`TransformerRegistry`].
///
/// Groups are declared explicitly with their discipline, then transformers
/// are registered into them with a priority. Group declaration order is the
/// order groups compose over a flowing envelope.
#[derive(Default)]
pub struct RegistryBuilder {
    groups: Vec<(String, GroupDiscipline)>,
    registrations: Vec<(String, u32, Arc<dyn Transformer>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, name: impl Into<String>, discipline: GroupDiscipline) -> Self {
        self.groups.push((name.into(), discipline));
        self
    }

    pub fn register(
        mut self,
        group: impl Into<String>,
        priority: u32,
        transformer: Arc<dyn Transformer>,
    ) -> Self {
        self.registrations.push((group.into(), priority, transformer));
        self
    }

    pub fn build(self) -> Result<TransformerRegistry, RegistryError> {
        let mut groups: Vec<Group> = Vec::with_capacity(self.groups.len());
        for (name, discipline) in self.groups {
            if groups.iter().any(|g| g.name == name) {
                return Err(RegistryError::DuplicateGroup(name));
            }
            groups.push(Group {
                name,
                discipline,
                registrations: Vec::new(),
            });
        }

        for (group_name, priority, transformer) in self.registrations {
            let group = groups
                .iter_mut()
                .find(|g| g.name == group_name)
                .ok_or_else(|| RegistryError::UnknownGroup(group_name.clone()))?;
            group.registrations.push(Registration {
                priority,
                transformer,
            });
        }

        for group in &mut groups {
            // Stable: equal priorities keep registration order.
            group.registrations.sort_by_key(|r| r.priority);
        }

        Ok(TransformerRegistry { groups })
    }
}

/// Immutable, ordered collection of transformers.
///
/// `classify` and `apply` are pure; the registry holds no mutable state once
/// constructed and is freely shared across replay workers. Construction
/// takes transformers already scoped by an explicit manifest — see
/// [`crate::transformers::migration_catalogue`].
pub struct TransformerRegistry {
    groups: Vec<Group>,
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field(
                "groups",
                &self.groups.iter().map(|g| &g.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TransformerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// First non-NoAction classification in group/priority order.
    pub fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        for group in &self.groups {
            for reg in &group.registrations {
                let kind = reg.transformer.classify(envelope);
                if !kind.is_no_action() {
                    return kind;
                }
            }
        }
        ActionKind::NoAction
    }

    /// Run the envelope through every group in declaration order.
    ///
    /// Returns 0 outputs when a transformer deactivates the event and 1
    /// output otherwise; fan-out beyond one envelope is reserved for
    /// explicitly documented transformers and unused by the default 1:1
    /// pipeline.
    pub fn apply(&self, envelope: &EventEnvelope) -> Result<Vec<EventEnvelope>, PipelineError> {
        let mut current = envelope.clone();

        for group in &self.groups {
            for reg in &group.registrations {
                let kind = reg.transformer.classify(&current);
                if kind.is_no_action() {
                    continue;
                }

                let action = reg.transformer.apply(&current).map_err(|source| PipelineError {
                    transformer: reg.transformer.id(),
                    stream_id: current.stream_id(),
                    version: current.version(),
                    source,
                })?;

                debug_assert_eq!(action.kind(), kind, "classify/apply disagreement");

                match action {
                    Action::NoAction => {}
                    Action::Transform(payload) => {
                        debug!(
                            transformer = reg.transformer.id(),
                            stream_id = %current.stream_id(),
                            version = current.version(),
                            "payload transformed"
                        );
                        current = current.with_payload(payload);
                    }
                    Action::Deactivate => {
                        debug!(
                            transformer = reg.transformer.id(),
                            stream_id = %current.stream_id(),
                            version = current.version(),
                            name = %current.name(),
                            "event deactivated"
                        );
                        return Ok(Vec::new());
                    }
                    Action::Redirect { name, payload } => {
                        debug!(
                            transformer = reg.transformer.id(),
                            stream_id = %current.stream_id(),
                            version = current.version(),
                            from = %current.name(),
                            to = %name,
                            "event redirected"
                        );
                        current = current.renamed(name, payload);
                    }
                }

                if group.discipline == GroupDiscipline::Exclusive {
                    break;
                }
            }
        }

        Ok(vec![current])
    }
}
