//! `casefold-events` — event envelope and metadata types.
//!
//! The envelope is the unit persisted in the append-only log and the unit
//! flowing through the read-time transformation pipeline.

pub mod envelope;
pub mod metadata;
pub mod name;

pub use envelope::EventEnvelope;
pub use metadata::CommandMetadata;
pub use name::EventName;
