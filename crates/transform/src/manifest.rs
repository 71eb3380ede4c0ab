//! Migration manifest: explicit, test-substitutable scoping configuration.
//!
//! Scoped event names, time cutovers and stream-id allow-lists live here and
//! are injected at registry construction. Transformer code never embeds
//! these as literals, so a one-time data patch for specific historical
//! streams is a manifest entry, not a code change.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use casefold_core::StreamId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest has no scope entry '{0}'")]
    MissingScope(String),
}

/// Which side of the cutover instant a transform applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoverSide {
    /// Only events created strictly before the instant.
    Before,
    /// Only events created strictly after the instant.
    After,
}

/// Time-window guard: "only events created under the old release need this fix".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cutover {
    pub at: DateTime<Utc>,
    pub side: CutoverSide,
}

impl Cutover {
    pub fn before(at: DateTime<Utc>) -> Self {
        Self {
            at,
            side: CutoverSide::Before,
        }
    }

    pub fn after(at: DateTime<Utc>) -> Self {
        Self {
            at,
            side: CutoverSide::After,
        }
    }

    /// Strict comparison on both sides; an event created exactly at the
    /// cutover instant is out of scope either way.
    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        match self.side {
            CutoverSide::Before => created_at < self.at,
            CutoverSide::After => created_at > self.at,
        }
    }
}

/// Scoping for one transformer registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// Event names this transformer owns (matched case-insensitively).
    pub event_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutover: Option<Cutover>,

    /// When set, the transform applies **only** to these streams — the shape
    /// of a one-time data patch for specific historical incidents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_allow_list: Option<Vec<StreamId>>,
}

impl ScopeEntry {
    pub fn for_events<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            event_names: names.into_iter().map(Into::into).collect(),
            cutover: None,
            stream_allow_list: None,
        }
    }

    pub fn with_cutover(mut self, cutover: Cutover) -> Self {
        self.cutover = Some(cutover);
        self
    }

    pub fn with_allow_list(mut self, streams: impl IntoIterator<Item = StreamId>) -> Self {
        self.stream_allow_list = Some(streams.into_iter().collect());
        self
    }
}

/// The full migration manifest, keyed by scope name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationManifest {
    scopes: BTreeMap<String, ScopeEntry>,
}

impl MigrationManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, key: impl Into<String>, entry: ScopeEntry) -> Self {
        self.scopes.insert(key.into(), entry);
        self
    }

    pub fn scope(&self, key: &str) -> Result<&ScopeEntry, ManifestError> {
        self.scopes
            .get(key)
            .ok_or_else(|| ManifestError::MissingScope(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cutover_comparison_is_strict() {
        let at = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();

        let before = Cutover::before(at);
        assert!(before.admits(at - chrono::Duration::seconds(1)));
        assert!(!before.admits(at));
        assert!(!before.admits(at + chrono::Duration::seconds(1)));

        let after = Cutover::after(at);
        assert!(!after.admits(at));
        assert!(after.admits(at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn missing_scope_is_a_typed_error() {
        let manifest = MigrationManifest::new();
        let err = manifest.scope("nope").unwrap_err();
        assert_eq!(err, ManifestError::MissingScope("nope".to_string()));
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let manifest = MigrationManifest::new().with_scope(
            "bail-status-expansion",
            ScopeEntry::for_events(["hearing.resulted"])
                .with_allow_list([StreamId::new(), StreamId::new()]),
        );

        let text = serde_json::to_string(&manifest).unwrap();
        let parsed: MigrationManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);
    }
}
