//! `casefold-replay` — the event log seam, the read-time normalization
//! pipeline, and the command-handling session.
//!
//! Rebuilding a projection means: load the raw stream, normalize it through
//! the transformer registry (never mutating the stored records), decode and
//! fold. Writing means a [`session::CaseSession`]: hydrate, execute commands,
//! commit the buffered envelopes atomically.

pub mod log;
pub mod pipeline;
pub mod session;


pub use log::{EventLog, EventLogError, InMemoryEventLog};
pub use pipeline::{normalize, rebuild, RebuildError};
pub use session::{CaseSession, SessionError};
