//! Command-handling session: a single-writer unit of work over one stream.
//!
//! Hydrate rebuilds current state through the normalization pipeline,
//! `execute` folds produced events into the in-memory state immediately (so
//! consecutive commands in one session see each other), and `commit` appends
//! the buffered envelopes atomically. A session that is dropped uncommitted
//! leaves no trace in the log.

use thiserror::Error;

use casefold_core::{Aggregate, DomainError, ExpectedVersion, StreamId};
use casefold_domain::{CaseCommand, CaseState};
use casefold_events::EventEnvelope;
use casefold_transform::TransformerRegistry;

use crate::log::{EventLog, EventLogError};
use crate::pipeline::{fold_envelopes, RebuildError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Log(#[from] EventLogError),

    #[error(transparent)]
    Rebuild(#[from] RebuildError),
}

pub struct CaseSession<L: EventLog> {
    log: L,
    stream_id: StreamId,
    state: CaseState,
    /// Head version of the **raw** stream at hydration (or last commit).
    /// Deactivated events still occupy versions, so this comes from the
    /// stored stream, never from the normalized one.
    base_version: u64,
    next_version: u64,
    uncommitted: Vec<EventEnvelope>,
}

impl<L: EventLog> CaseSession<L> {
    /// Load the raw stream and fold it (through the registry) into state.
    pub fn hydrate(
        log: L,
        registry: &TransformerRegistry,
        stream_id: StreamId,
    ) -> Result<Self, SessionError> {
        let raw = log.load_stream(stream_id).map_err(RebuildError::from)?;
        let base_version = raw.last().map(|e| e.version()).unwrap_or(0);
        let state = fold_envelopes(raw, registry)?;
        Ok(Self {
            log,
            stream_id,
            state,
            base_version,
            next_version: base_version,
            uncommitted: Vec::new(),
        })
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn state(&self) -> &CaseState {
        &self.state
    }

    pub fn uncommitted(&self) -> &[EventEnvelope] {
        &self.uncommitted
    }

    /// Handle one command; returns how many events it produced.
    ///
    /// Zero is a valid outcome (the aggregate's deliberate no-ops). Produced
    /// events are enveloped with consecutive versions and the command's
    /// metadata, folded into state, and buffered until [`Self::commit`].
    pub fn execute(&mut self, command: &CaseCommand) -> Result<usize, SessionError> {
        let events = self.state.handle(command)?;
        if events.is_empty() {
            tracing::debug!(stream_id = %self.stream_id, "command was a deliberate no-op");
            return Ok(0);
        }

        // Envelope every event before touching state or the buffer: a
        // payload-encoding failure anywhere in the batch leaves the session
        // exactly as it was.
        let mut envelopes = Vec::with_capacity(events.len());
        for (offset, event) in events.iter().enumerate() {
            let payload = event.payload()?;
            envelopes.push(EventEnvelope::from_command(
                self.stream_id,
                self.next_version + 1 + offset as u64,
                event.name(),
                command.occurred_at(),
                command.metadata(),
                payload,
            ));
        }

        self.next_version += events.len() as u64;
        for event in &events {
            self.state.apply(event);
        }
        self.uncommitted.extend(envelopes);
        Ok(events.len())
    }

    /// Append everything buffered so far, atomically.
    ///
    /// Uses the hydration-time head as the optimistic concurrency check, so a
    /// concurrent writer on the same stream turns into
    /// [`EventLogError::Conflict`] instead of interleaved history.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        if self.uncommitted.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.uncommitted);
        self.log
            .append(batch, ExpectedVersion::Exact(self.base_version))?;
        self.base_version = self.next_version;
        Ok(())
    }
}
