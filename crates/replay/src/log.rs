//! Event log seam.
//!
//! The log is append-only: versions per stream are contiguous and strictly
//! increasing, and a stored envelope is never rewritten. The in-memory
//! implementation carries the same contract as a durable store and backs
//! tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use casefold_core::{ExpectedVersion, StreamId};
use casefold_events::EventEnvelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventLogError {
    /// Optimistic concurrency failure: the stream moved since the writer
    /// last observed it.
    #[error("version conflict on stream {stream_id}: expected {expected:?}, found {actual}")]
    Conflict {
        stream_id: StreamId,
        expected: ExpectedVersion,
        actual: u64,
    },

    /// The batch itself is malformed (empty, spans streams, gaps in versions).
    #[error("invalid append: {0}")]
    InvalidAppend(String),
}

pub trait EventLog: Send + Sync {
    /// Append one batch to a single stream, atomically.
    ///
    /// Either the whole batch lands or none of it does. `expected` is checked
    /// against the stream's current head version.
    fn append(&self, events: Vec<EventEnvelope>, expected: ExpectedVersion)
        -> Result<(), EventLogError>;

    /// Load a full stream in ascending version order. An unknown stream is
    /// an empty stream, not an error.
    fn load_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>, EventLogError>;
}

impl<L: EventLog + ?Sized> EventLog for Arc<L> {
    fn append(
        &self,
        events: Vec<EventEnvelope>,
        expected: ExpectedVersion,
    ) -> Result<(), EventLogError> {
        (**self).append(events, expected)
    }

    fn load_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>, EventLogError> {
        (**self).load_stream(stream_id)
    }
}

/// In-memory event log for tests and local development.
#[derive(Default)]
pub struct InMemoryEventLog {
    streams: Mutex<HashMap<StreamId, Vec<EventEnvelope>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(
        &self,
        events: Vec<EventEnvelope>,
        expected: ExpectedVersion,
    ) -> Result<(), EventLogError> {
        let Some(first) = events.first() else {
            return Err(EventLogError::InvalidAppend("empty batch".to_string()));
        };
        let stream_id = first.stream_id();
        if events.iter().any(|e| e.stream_id() != stream_id) {
            return Err(EventLogError::InvalidAppend(
                "batch spans multiple streams".to_string(),
            ));
        }

        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        let stream = streams.entry(stream_id).or_default();
        let actual = stream.last().map(|e| e.version()).unwrap_or(0);

        if !expected.matches(actual) {
            return Err(EventLogError::Conflict {
                stream_id,
                expected,
                actual,
            });
        }

        for (offset, event) in events.iter().enumerate() {
            let want = actual + 1 + offset as u64;
            if event.version() != want {
                return Err(EventLogError::InvalidAppend(format!(
                    "version {} out of sequence (expected {want})",
                    event.version()
                )));
            }
        }

        tracing::debug!(%stream_id, count = events.len(), from = actual + 1, "batch appended");
        stream.extend(events);
        Ok(())
    }

    fn load_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>, EventLogError> {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(streams.get(&stream_id).cloned().unwrap_or_default())
    }
}
