//! Causation metadata shared by commands and the events they produce.

use serde::{Deserialize, Serialize};

use casefold_core::{CausationId, CorrelationId, UserId};

/// Metadata attached to an incoming command and carried forward onto every
/// event the command produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub causation_id: CausationId,
    pub correlation_id: CorrelationId,
    pub user_id: UserId,
}

impl CommandMetadata {
    pub fn new(causation_id: CausationId, correlation_id: CorrelationId, user_id: UserId) -> Self {
        Self {
            causation_id,
            correlation_id,
            user_id,
        }
    }
}
