//! `casefold-transform` — read-time schema migration for the event log.
//!
//! Historical envelopes are reinterpreted under the current schema when
//! projections are rebuilt. The durable log is never mutated: every
//! transformer here is a pure classify+rewrite unit producing fresh
//! envelopes, and DEACTIVATE/REDIRECT affect only the read-time projection.

pub mod action;
pub mod error;
pub mod lookup;
pub mod manifest;
pub mod path;
pub mod registry;
pub mod rewrite;
pub mod scope;
pub mod transformer;
pub mod transformers;

pub use action::{Action, ActionKind};
pub use error::{PipelineError, TransformError};
pub use lookup::{InMemoryReferenceData, LookupError, ReferenceData};
pub use manifest::{Cutover, CutoverSide, ManifestError, MigrationManifest, ScopeEntry};
pub use path::{Path, PathPattern, PathSegment};
pub use registry::{GroupDiscipline, RegistryBuilder, RegistryError, TransformerRegistry};
pub use rewrite::{any_node, rewrite};
pub use scope::EventScope;
pub use transformer::Transformer;
