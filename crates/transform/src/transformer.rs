//! The transformer contract: pure classify + rewrite.

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;

/// A pure classify+rewrite unit adapting a historical envelope to the
/// current schema at read time.
///
/// Classification and application are separable but must agree:
/// - `apply` is only invoked when `classify` returned something other than
///   [`ActionKind::NoAction`];
/// - `apply` must produce an [`Action`] of the classified kind.
///
/// `classify` evaluates its guards in order of increasing specificity:
/// 1. event-name match (exact, case-insensitive) against the static set this
///    transformer owns;
/// 2. already-migrated payload guard (idempotence: re-running the pipeline
///    on its own output is inert);
/// 3. optional time-window guard (strictly before/after a cutover instant);
/// 4. optional stream-id allow-list (one-time patches; NoAction outside the
///    list even on exact shape match).
///
/// Implementations are stateless and safe for unrestricted concurrent use
/// from many replay workers.
pub trait Transformer: Send + Sync {
    /// Stable identity for triage context in pipeline errors.
    fn id(&self) -> &'static str;

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind;

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError>;
}
