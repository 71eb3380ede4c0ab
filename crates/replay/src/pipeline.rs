//! Read-time normalization and projection rebuild.
//!
//! `normalize` is a lazy, forward-only pass over one stream: events flow in
//! stored order, each is run through the registry, and the output never
//! reorders. Deactivated events simply vanish from the normalized sequence
//! (their versions still exist in the durable log). There is no resume
//! protocol: a restarted rebuild re-reads the stream from the start.

use thiserror::Error;

use casefold_core::{Aggregate, DomainError, StreamId};
use casefold_domain::{CaseEvent, CaseState};
use casefold_events::EventEnvelope;
use casefold_transform::{PipelineError, TransformerRegistry};

use crate::log::{EventLog, EventLogError};

#[derive(Debug, Error)]
pub enum RebuildError {
    #[error(transparent)]
    Log(#[from] EventLogError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A normalized envelope failed to decode into a typed event. Either the
    /// migration catalogue is incomplete or a producer wrote garbage; both
    /// need a human.
    #[error("undecodable event on stream {stream_id} at version {version}: {source}")]
    Decode {
        stream_id: StreamId,
        version: u64,
        source: DomainError,
    },
}

/// Normalize a stored sequence through the registry, lazily.
///
/// Yields at most one envelope per input event (deactivation yields none).
/// A transform failure is yielded as `Err` in place — fatal for that event,
/// never skipped over silently.
pub fn normalize<I>(
    events: I,
    registry: &TransformerRegistry,
) -> impl Iterator<Item = Result<EventEnvelope, PipelineError>>
where
    I: IntoIterator<Item = EventEnvelope>,
{
    events.into_iter().flat_map(move |envelope| {
        match registry.apply(&envelope) {
            Ok(outputs) => outputs.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        }
    })
}

pub(crate) fn fold_envelopes(
    raw: Vec<EventEnvelope>,
    registry: &TransformerRegistry,
) -> Result<CaseState, RebuildError> {
    let mut state = CaseState::default();
    for normalized in normalize(raw, registry) {
        let envelope = normalized?;
        let event = CaseEvent::decode(envelope.name(), envelope.payload()).map_err(|source| {
            RebuildError::Decode {
                stream_id: envelope.stream_id(),
                version: envelope.version(),
                source,
            }
        })?;
        state.apply(&event);
    }
    Ok(state)
}

/// Rebuild one case projection from its raw stream.
pub fn rebuild(
    stream_id: StreamId,
    log: &impl EventLog,
    registry: &TransformerRegistry,
) -> Result<CaseState, RebuildError> {
    let raw = log.load_stream(stream_id)?;
    tracing::debug!(%stream_id, raw_events = raw.len(), "rebuilding projection");
    fold_envelopes(raw, registry)
}
