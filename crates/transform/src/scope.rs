//! Shared guard evaluator for transformer classification.

use casefold_events::EventEnvelope;

use crate::manifest::{Cutover, ScopeEntry};
use casefold_core::StreamId;

/// The manifest-driven part of a transformer's `classify` guards:
/// name match, time window, stream-id allow-list.
///
/// The already-migrated guard is payload-shape specific and stays with each
/// transformer.
#[derive(Debug, Clone)]
pub struct EventScope {
    event_names: Vec<String>,
    cutover: Option<Cutover>,
    stream_allow_list: Option<Vec<StreamId>>,
}

impl EventScope {
    pub fn from_entry(entry: &ScopeEntry) -> Self {
        Self {
            event_names: entry.event_names.clone(),
            cutover: entry.cutover,
            stream_allow_list: entry.stream_allow_list.clone(),
        }
    }

    pub fn event_names(&self) -> &[String] {
        &self.event_names
    }

    /// Do all active guards admit this envelope?
    ///
    /// Guard order follows increasing specificity: name, time window,
    /// allow-list. An allow-listed scope returns `false` for every stream
    /// outside the list even when the name matches exactly.
    pub fn admits(&self, envelope: &EventEnvelope) -> bool {
        self.admits_name(envelope) && self.admits_ignoring_name(envelope)
    }

    /// Name guard only (case-insensitive membership).
    pub fn admits_name(&self, envelope: &EventEnvelope) -> bool {
        envelope
            .name()
            .matches_any(self.event_names.iter().map(String::as_str))
    }

    /// Time-window and allow-list guards, skipping the name guard.
    ///
    /// Used by transformers whose name predicate is not a plain set
    /// membership (e.g. suffix-based redirects).
    pub fn admits_ignoring_name(&self, envelope: &EventEnvelope) -> bool {
        if let Some(cutover) = &self.cutover {
            if !cutover.admits(envelope.created_at()) {
                return false;
            }
        }
        if let Some(allow) = &self.stream_allow_list {
            if !allow.contains(&envelope.stream_id()) {
                return false;
            }
        }
        true
    }
}
