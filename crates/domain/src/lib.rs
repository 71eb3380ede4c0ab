//! Case aggregate: typed events, typed commands, fold, command handling.

pub mod case;

pub use case::{
    AttendanceDay, AttendanceType, AttendanceUpdated, BailStatus, BailUpdated, CaseCommand,
    CaseEvent, CaseOpened, CaseState, DefendantAdded, DefendantAttendance, DefendantBail,
    DefendantDetailsUpdated, DefendantRecord, DocumentReceived, DocumentRecord, HearingAttendance,
};
