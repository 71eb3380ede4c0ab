//! Event envelope: one versioned fact recorded in a stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use casefold_core::{CausationId, CorrelationId, StreamId, UserId};

use crate::metadata::CommandMetadata;
use crate::name::EventName;

/// Envelope for an event, containing stream position and causation metadata.
///
/// This is the unit you persist/append to an event stream.
///
/// Notes:
/// - **Append-only**: `version` is monotonically increasing per stream and
///   an envelope is never mutated once stored.
/// - Read-time transformations never touch the stored record; they produce
///   *fresh* envelopes via [`EventEnvelope::with_payload`] and
///   [`EventEnvelope::renamed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_id: Uuid,
    stream_id: StreamId,

    /// Monotonically increasing position in the stream.
    version: u64,

    name: EventName,
    created_at: DateTime<Utc>,

    causation_id: CausationId,
    correlation_id: CorrelationId,
    user_id: UserId,

    payload: JsonValue,
}

impl EventEnvelope {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: Uuid,
        stream_id: StreamId,
        version: u64,
        name: impl Into<EventName>,
        created_at: DateTime<Utc>,
        causation_id: CausationId,
        correlation_id: CorrelationId,
        user_id: UserId,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id,
            stream_id,
            version,
            name: name.into(),
            created_at,
            causation_id,
            correlation_id,
            user_id,
            payload,
        }
    }

    /// Build a new envelope from command handling, carrying forward the
    /// causation/correlation/user metadata of the triggering command.
    pub fn from_command(
        stream_id: StreamId,
        version: u64,
        name: impl Into<EventName>,
        created_at: DateTime<Utc>,
        metadata: &CommandMetadata,
        payload: JsonValue,
    ) -> Self {
        Self::new(
            Uuid::now_v7(),
            stream_id,
            version,
            name,
            created_at,
            metadata.causation_id,
            metadata.correlation_id,
            metadata.user_id,
            payload,
        )
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn causation_id(&self) -> CausationId {
        self.causation_id
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn into_payload(self) -> JsonValue {
        self.payload
    }

    /// Fresh envelope with a rewritten payload; all metadata preserved.
    ///
    /// This is the read-time projection of a TRANSFORM action. The stored
    /// record is untouched.
    pub fn with_payload(&self, payload: JsonValue) -> Self {
        Self {
            payload,
            ..self.clone()
        }
    }

    /// Fresh envelope with the effective name replaced and, optionally, the
    /// payload replaced as well (REDIRECT action).
    pub fn renamed(&self, name: impl Into<EventName>, payload: Option<JsonValue>) -> Self {
        Self {
            name: name.into(),
            payload: payload.unwrap_or_else(|| self.payload.clone()),
            ..self.clone()
        }
    }
}
