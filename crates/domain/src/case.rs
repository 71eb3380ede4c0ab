//! The case aggregate.
//!
//! State is mutable only through the fold ([`Aggregate::apply`]); command
//! handling ([`Aggregate::handle`]) is pure decision logic returning events.
//! The fold consumes **normalized** events only — envelopes that already went
//! through the read-time transformation pipeline — so it never sees legacy
//! shapes or retired names.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use casefold_core::{Aggregate, DefendantId, DomainError, DomainResult};
use casefold_events::{CommandMetadata, EventName};

/// Normalized event names the fold understands.
pub mod names {
    pub const CASE_OPENED: &str = "case.opened";
    pub const DEFENDANT_ADDED: &str = "case.defendant.added";
    pub const DEFENDANT_DETAILS_UPDATED: &str = "case.defendant.details-updated";
    pub const ATTENDANCE_UPDATED: &str = "hearing.attendance-updated";
    pub const BAIL_UPDATED: &str = "case.bail-updated";
    pub const DOCUMENT_RECEIVED: &str = "case.document.received";
}

/// How a defendant attended one hearing day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceType {
    InPerson,
    NotPresent,
}

/// Current bail vocabulary (the legacy two-value enum is expanded to this at
/// read time).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BailStatus {
    RemandedInCustody,
    ConditionalBail,
    UnconditionalBail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOpened {
    pub case_urn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefendantAdded {
    pub defendant_id: DefendantId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update: only the present fields change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefendantDetailsUpdated {
    pub defendant_id: DefendantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDay {
    pub day: NaiveDate,
    pub attendance_type: AttendanceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefendantAttendance {
    pub defendant_id: DefendantId,
    pub attendance_days: Vec<AttendanceDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingAttendance {
    pub defendant_attendance: Vec<DefendantAttendance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdated {
    pub hearing: HearingAttendance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefendantBail {
    pub defendant_id: DefendantId,
    pub bail_status: BailStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BailUpdated {
    pub defendants: Vec<DefendantBail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReceived {
    pub document_id: String,
    pub document_type_id: String,
    pub document_category: String,
}

/// Typed case event, decoded from a normalized envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseEvent {
    Opened(CaseOpened),
    DefendantAdded(DefendantAdded),
    DefendantDetailsUpdated(DefendantDetailsUpdated),
    AttendanceUpdated(AttendanceUpdated),
    BailUpdated(BailUpdated),
    DocumentReceived(DocumentReceived),
}

fn decode_payload<T: DeserializeOwned>(name: &EventName, payload: &JsonValue) -> DomainResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|e| DomainError::validation(format!("malformed {name} payload: {e}")))
}

impl CaseEvent {
    /// Decode a normalized `(name, payload)` pair.
    ///
    /// An unknown name here means an event reached the fold without going
    /// through normalization (or the migration catalogue is incomplete) and
    /// is surfaced as [`DomainError::UnknownEvent`], never skipped.
    pub fn decode(name: &EventName, payload: &JsonValue) -> DomainResult<Self> {
        if name.matches(names::CASE_OPENED) {
            Ok(Self::Opened(decode_payload(name, payload)?))
        } else if name.matches(names::DEFENDANT_ADDED) {
            Ok(Self::DefendantAdded(decode_payload(name, payload)?))
        } else if name.matches(names::DEFENDANT_DETAILS_UPDATED) {
            Ok(Self::DefendantDetailsUpdated(decode_payload(name, payload)?))
        } else if name.matches(names::ATTENDANCE_UPDATED) {
            Ok(Self::AttendanceUpdated(decode_payload(name, payload)?))
        } else if name.matches(names::BAIL_UPDATED) {
            Ok(Self::BailUpdated(decode_payload(name, payload)?))
        } else if name.matches(names::DOCUMENT_RECEIVED) {
            Ok(Self::DocumentReceived(decode_payload(name, payload)?))
        } else {
            Err(DomainError::unknown_event(name.as_str()))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Opened(_) => names::CASE_OPENED,
            Self::DefendantAdded(_) => names::DEFENDANT_ADDED,
            Self::DefendantDetailsUpdated(_) => names::DEFENDANT_DETAILS_UPDATED,
            Self::AttendanceUpdated(_) => names::ATTENDANCE_UPDATED,
            Self::BailUpdated(_) => names::BAIL_UPDATED,
            Self::DocumentReceived(_) => names::DOCUMENT_RECEIVED,
        }
    }

    /// Encode the event body for enveloping.
    pub fn payload(&self) -> DomainResult<JsonValue> {
        let encoded = match self {
            Self::Opened(p) => serde_json::to_value(p),
            Self::DefendantAdded(p) => serde_json::to_value(p),
            Self::DefendantDetailsUpdated(p) => serde_json::to_value(p),
            Self::AttendanceUpdated(p) => serde_json::to_value(p),
            Self::BailUpdated(p) => serde_json::to_value(p),
            Self::DocumentReceived(p) => serde_json::to_value(p),
        };
        encoded.map_err(|e| DomainError::validation(format!("unencodable event payload: {e}")))
    }
}

/// Commands accepted by the case aggregate.
///
/// Every command carries the metadata propagated onto the events it produces
/// and the business instant it occurred at.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseCommand {
    OpenCase {
        case_urn: String,
        occurred_at: DateTime<Utc>,
        metadata: CommandMetadata,
    },
    AddDefendant {
        defendant_id: DefendantId,
        first_name: String,
        last_name: String,
        date_of_birth: Option<NaiveDate>,
        occurred_at: DateTime<Utc>,
        metadata: CommandMetadata,
    },
    UpdateDefendantDetails {
        defendant_id: DefendantId,
        first_name: Option<String>,
        last_name: Option<String>,
        date_of_birth: Option<NaiveDate>,
        occurred_at: DateTime<Utc>,
        metadata: CommandMetadata,
    },
    RecordAttendance {
        defendant_id: DefendantId,
        days: Vec<AttendanceDay>,
        occurred_at: DateTime<Utc>,
        metadata: CommandMetadata,
    },
    ChangeBailStatus {
        defendant_id: DefendantId,
        bail_status: BailStatus,
        occurred_at: DateTime<Utc>,
        metadata: CommandMetadata,
    },
}

impl CaseCommand {
    pub fn metadata(&self) -> &CommandMetadata {
        match self {
            Self::OpenCase { metadata, .. }
            | Self::AddDefendant { metadata, .. }
            | Self::UpdateDefendantDetails { metadata, .. }
            | Self::RecordAttendance { metadata, .. }
            | Self::ChangeBailStatus { metadata, .. } => metadata,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::OpenCase { occurred_at, .. }
            | Self::AddDefendant { occurred_at, .. }
            | Self::UpdateDefendantDetails { occurred_at, .. }
            | Self::RecordAttendance { occurred_at, .. }
            | Self::ChangeBailStatus { occurred_at, .. } => *occurred_at,
        }
    }
}

/// One defendant as currently known to the case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefendantRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub bail_status: Option<BailStatus>,
    pub attendance: BTreeMap<NaiveDate, AttendanceType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub document_id: String,
    pub category: String,
}

/// Rebuilt per-stream state of one case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseState {
    urn: Option<String>,
    opened: bool,
    defendants: BTreeMap<DefendantId, DefendantRecord>,
    documents: Vec<DocumentRecord>,
}

impl CaseState {
    pub fn urn(&self) -> Option<&str> {
        self.urn.as_deref()
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn defendants(&self) -> &BTreeMap<DefendantId, DefendantRecord> {
        &self.defendants
    }

    pub fn defendant(&self, id: DefendantId) -> Option<&DefendantRecord> {
        self.defendants.get(&id)
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }
}

impl Aggregate for CaseState {
    type Command = CaseCommand;
    type Event = CaseEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &CaseEvent) {
        match event {
            CaseEvent::Opened(e) => {
                self.urn = Some(e.case_urn.clone());
                self.opened = true;
            }
            CaseEvent::DefendantAdded(e) => {
                self.defendants.insert(
                    e.defendant_id,
                    DefendantRecord {
                        first_name: Some(e.first_name.clone()),
                        last_name: Some(e.last_name.clone()),
                        date_of_birth: e.date_of_birth,
                        ..DefendantRecord::default()
                    },
                );
            }
            CaseEvent::DefendantDetailsUpdated(e) => {
                // Inherently an in-place update: with no record to update the
                // event is discarded (the adding stream wins at replay).
                let Some(record) = self.defendants.get_mut(&e.defendant_id) else {
                    tracing::debug!(defendant_id = %e.defendant_id, "details update for unknown defendant discarded");
                    return;
                };
                if let Some(first_name) = &e.first_name {
                    record.first_name = Some(first_name.clone());
                }
                if let Some(last_name) = &e.last_name {
                    record.last_name = Some(last_name.clone());
                }
                if let Some(dob) = e.date_of_birth {
                    record.date_of_birth = Some(dob);
                }
            }
            CaseEvent::AttendanceUpdated(e) => {
                // Attendance carries enough to stand alone, so an unknown
                // defendant gets a placeholder record instead of a discard.
                for attendance in &e.hearing.defendant_attendance {
                    let record = self
                        .defendants
                        .entry(attendance.defendant_id)
                        .or_default();
                    for day in &attendance.attendance_days {
                        record.attendance.insert(day.day, day.attendance_type);
                    }
                }
            }
            CaseEvent::BailUpdated(e) => {
                for bail in &e.defendants {
                    match self.defendants.get_mut(&bail.defendant_id) {
                        Some(record) => record.bail_status = Some(bail.bail_status),
                        None => {
                            tracing::debug!(defendant_id = %bail.defendant_id, "bail update for unknown defendant discarded");
                        }
                    }
                }
            }
            CaseEvent::DocumentReceived(e) => {
                self.documents.push(DocumentRecord {
                    document_id: e.document_id.clone(),
                    category: e.document_category.clone(),
                });
            }
        }
    }

    fn handle(&self, command: &CaseCommand) -> DomainResult<Vec<CaseEvent>> {
        match command {
            CaseCommand::OpenCase { case_urn, .. } => {
                if case_urn.trim().is_empty() {
                    return Err(DomainError::validation("case URN must not be empty"));
                }
                if self.opened {
                    return Err(DomainError::invariant("case is already opened"));
                }
                Ok(vec![CaseEvent::Opened(CaseOpened {
                    case_urn: case_urn.clone(),
                })])
            }

            CaseCommand::AddDefendant {
                defendant_id,
                first_name,
                last_name,
                date_of_birth,
                ..
            } => {
                if !self.opened {
                    return Err(DomainError::invariant(
                        "cannot add a defendant to an unopened case",
                    ));
                }
                if first_name.trim().is_empty() || last_name.trim().is_empty() {
                    return Err(DomainError::validation("defendant name must not be empty"));
                }
                if self.defendants.contains_key(defendant_id) {
                    return Err(DomainError::conflict(format!(
                        "defendant {defendant_id} already present"
                    )));
                }
                Ok(vec![CaseEvent::DefendantAdded(DefendantAdded {
                    defendant_id: *defendant_id,
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    date_of_birth: *date_of_birth,
                })])
            }

            CaseCommand::UpdateDefendantDetails {
                defendant_id,
                first_name,
                last_name,
                date_of_birth,
                ..
            } => {
                if first_name.is_none() && last_name.is_none() && date_of_birth.is_none() {
                    return Err(DomainError::validation(
                        "details update must change at least one field",
                    ));
                }
                // Absent target: deliberate no-op, not an error.
                if !self.defendants.contains_key(defendant_id) {
                    tracing::debug!(%defendant_id, "details update targets unknown defendant, no-op");
                    return Ok(vec![]);
                }
                Ok(vec![CaseEvent::DefendantDetailsUpdated(
                    DefendantDetailsUpdated {
                        defendant_id: *defendant_id,
                        first_name: first_name.clone(),
                        last_name: last_name.clone(),
                        date_of_birth: *date_of_birth,
                    },
                )])
            }

            CaseCommand::RecordAttendance {
                defendant_id, days, ..
            } => {
                if days.is_empty() {
                    return Err(DomainError::validation(
                        "attendance must cover at least one day",
                    ));
                }
                if !self.defendants.contains_key(defendant_id) {
                    tracing::debug!(%defendant_id, "attendance targets unknown defendant, no-op");
                    return Ok(vec![]);
                }
                Ok(vec![CaseEvent::AttendanceUpdated(AttendanceUpdated {
                    hearing: HearingAttendance {
                        defendant_attendance: vec![DefendantAttendance {
                            defendant_id: *defendant_id,
                            attendance_days: days.clone(),
                        }],
                    },
                })])
            }

            CaseCommand::ChangeBailStatus {
                defendant_id,
                bail_status,
                ..
            } => {
                let Some(record) = self.defendants.get(defendant_id) else {
                    tracing::debug!(%defendant_id, "bail change targets unknown defendant, no-op");
                    return Ok(vec![]);
                };
                // Re-issuing the current status is idempotent.
                if record.bail_status == Some(*bail_status) {
                    return Ok(vec![]);
                }
                Ok(vec![CaseEvent::BailUpdated(BailUpdated {
                    defendants: vec![DefendantBail {
                        defendant_id: *defendant_id,
                        bail_status: *bail_status,
                    }],
                })])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefold_core::{CausationId, CorrelationId, UserId};
    use serde_json::json;

    fn metadata() -> CommandMetadata {
        CommandMetadata::new(CausationId::new(), CorrelationId::new(), UserId::new())
    }

    fn opened_case() -> CaseState {
        let mut state = CaseState::default();
        state.apply(&CaseEvent::Opened(CaseOpened {
            case_urn: "90CD1234521".into(),
        }));
        state
    }

    fn case_with_defendant(id: DefendantId) -> CaseState {
        let mut state = opened_case();
        state.apply(&CaseEvent::DefendantAdded(DefendantAdded {
            defendant_id: id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: None,
        }));
        state
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn decode_rejects_unknown_names() {
        let err =
            CaseEvent::decode(&EventName::new("case.sync-pinged"), &json!({})).unwrap_err();
        assert!(matches!(err, DomainError::UnknownEvent(name) if name == "case.sync-pinged"));
    }

    #[test]
    fn decode_is_case_insensitive_on_names() {
        let decoded = CaseEvent::decode(
            &EventName::new("CASE.OPENED"),
            &json!({"caseUrn": "90CD1234521"}),
        )
        .unwrap();
        assert_eq!(
            decoded,
            CaseEvent::Opened(CaseOpened {
                case_urn: "90CD1234521".into()
            })
        );
    }

    #[test]
    fn decode_reads_the_normalized_bail_shape() {
        let id = DefendantId::new();
        let decoded = CaseEvent::decode(
            &EventName::new("case.bail-updated"),
            &json!({"defendants": [
                {"defendantId": id, "bailStatus": "REMANDED_IN_CUSTODY"},
            ]}),
        )
        .unwrap();
        assert_eq!(
            decoded,
            CaseEvent::BailUpdated(BailUpdated {
                defendants: vec![DefendantBail {
                    defendant_id: id,
                    bail_status: BailStatus::RemandedInCustody,
                }],
            })
        );
    }

    #[test]
    fn decode_surfaces_malformed_payloads_as_validation() {
        let err = CaseEvent::decode(&EventName::new("case.opened"), &json!({})).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn event_encoding_round_trips() {
        let event = CaseEvent::AttendanceUpdated(AttendanceUpdated {
            hearing: HearingAttendance {
                defendant_attendance: vec![DefendantAttendance {
                    defendant_id: DefendantId::new(),
                    attendance_days: vec![AttendanceDay {
                        day: day(4),
                        attendance_type: AttendanceType::InPerson,
                    }],
                }],
            },
        });

        let payload = event.payload().unwrap();
        assert_eq!(
            payload["hearing"]["defendantAttendance"][0]["attendanceDays"][0]["attendanceType"],
            "IN_PERSON"
        );
        let decoded = CaseEvent::decode(&EventName::new(event.name()), &payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn fold_attendance_creates_a_placeholder_for_unknown_defendants() {
        let id = DefendantId::new();
        let mut state = opened_case();

        state.apply(&CaseEvent::AttendanceUpdated(AttendanceUpdated {
            hearing: HearingAttendance {
                defendant_attendance: vec![DefendantAttendance {
                    defendant_id: id,
                    attendance_days: vec![AttendanceDay {
                        day: day(4),
                        attendance_type: AttendanceType::NotPresent,
                    }],
                }],
            },
        }));

        let record = state.defendant(id).expect("placeholder record");
        assert_eq!(record.first_name, None);
        assert_eq!(record.attendance[&day(4)], AttendanceType::NotPresent);
    }

    #[test]
    fn fold_discards_detail_updates_for_unknown_defendants() {
        let mut state = opened_case();
        state.apply(&CaseEvent::DefendantDetailsUpdated(DefendantDetailsUpdated {
            defendant_id: DefendantId::new(),
            first_name: Some("Grace".into()),
            last_name: None,
            date_of_birth: None,
        }));
        assert!(state.defendants().is_empty());
    }

    #[test]
    fn fold_discards_bail_updates_for_unknown_defendants() {
        let known = DefendantId::new();
        let unknown = DefendantId::new();
        let mut state = case_with_defendant(known);

        state.apply(&CaseEvent::BailUpdated(BailUpdated {
            defendants: vec![
                DefendantBail {
                    defendant_id: known,
                    bail_status: BailStatus::ConditionalBail,
                },
                DefendantBail {
                    defendant_id: unknown,
                    bail_status: BailStatus::UnconditionalBail,
                },
            ],
        }));

        assert_eq!(
            state.defendant(known).unwrap().bail_status,
            Some(BailStatus::ConditionalBail)
        );
        assert!(state.defendant(unknown).is_none());
    }

    #[test]
    fn fold_merges_partial_detail_updates() {
        let id = DefendantId::new();
        let mut state = case_with_defendant(id);

        state.apply(&CaseEvent::DefendantDetailsUpdated(DefendantDetailsUpdated {
            defendant_id: id,
            first_name: None,
            last_name: Some("King".into()),
            date_of_birth: Some(day(1)),
        }));

        let record = state.defendant(id).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Ada"));
        assert_eq!(record.last_name.as_deref(), Some("King"));
        assert_eq!(record.date_of_birth, Some(day(1)));
    }

    #[test]
    fn fold_collects_received_documents() {
        let mut state = opened_case();
        state.apply(&CaseEvent::DocumentReceived(DocumentReceived {
            document_id: "d1".into(),
            document_type_id: "MG11".into(),
            document_category: "WITNESS_STATEMENT".into(),
        }));
        assert_eq!(state.documents().len(), 1);
        assert_eq!(state.documents()[0].category, "WITNESS_STATEMENT");
    }

    #[test]
    fn open_case_emits_and_folds() {
        let state = CaseState::default();
        let events = state
            .handle(&CaseCommand::OpenCase {
                case_urn: "90CD1234521".into(),
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap();
        assert_eq!(events.len(), 1);

        let mut folded = state.clone();
        for event in &events {
            folded.apply(event);
        }
        assert!(folded.is_opened());
        assert_eq!(folded.urn(), Some("90CD1234521"));
    }

    #[test]
    fn reopening_a_case_violates_an_invariant() {
        let state = opened_case();
        let err = state
            .handle(&CaseCommand::OpenCase {
                case_urn: "90CD1234521".into(),
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn blank_urn_fails_validation() {
        let err = CaseState::default()
            .handle(&CaseCommand::OpenCase {
                case_urn: "   ".into(),
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn attendance_for_an_unknown_defendant_is_a_no_op_command() {
        let state = opened_case();
        let events = state
            .handle(&CaseCommand::RecordAttendance {
                defendant_id: DefendantId::new(),
                days: vec![AttendanceDay {
                    day: day(4),
                    attendance_type: AttendanceType::InPerson,
                }],
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn attendance_with_no_days_fails_validation() {
        let id = DefendantId::new();
        let state = case_with_defendant(id);
        let err = state
            .handle(&CaseCommand::RecordAttendance {
                defendant_id: id,
                days: vec![],
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn recording_attendance_updates_the_defendant_record() {
        let id = DefendantId::new();
        let state = case_with_defendant(id);
        let events = state
            .handle(&CaseCommand::RecordAttendance {
                defendant_id: id,
                days: vec![
                    AttendanceDay {
                        day: day(4),
                        attendance_type: AttendanceType::InPerson,
                    },
                    AttendanceDay {
                        day: day(5),
                        attendance_type: AttendanceType::NotPresent,
                    },
                ],
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap();

        let mut folded = state.clone();
        for event in &events {
            folded.apply(event);
        }
        let record = folded.defendant(id).unwrap();
        assert_eq!(record.attendance[&day(4)], AttendanceType::InPerson);
        assert_eq!(record.attendance[&day(5)], AttendanceType::NotPresent);
    }

    #[test]
    fn adding_a_defendant_twice_conflicts() {
        let id = DefendantId::new();
        let state = case_with_defendant(id);
        let err = state
            .handle(&CaseCommand::AddDefendant {
                defendant_id: id,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                date_of_birth: None,
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn changing_bail_to_the_current_status_emits_nothing() {
        let id = DefendantId::new();
        let mut state = case_with_defendant(id);
        state.apply(&CaseEvent::BailUpdated(BailUpdated {
            defendants: vec![DefendantBail {
                defendant_id: id,
                bail_status: BailStatus::ConditionalBail,
            }],
        }));

        let events = state
            .handle(&CaseCommand::ChangeBailStatus {
                defendant_id: id,
                bail_status: BailStatus::ConditionalBail,
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap();
        assert!(events.is_empty());

        let events = state
            .handle(&CaseCommand::ChangeBailStatus {
                defendant_id: id,
                bail_status: BailStatus::RemandedInCustody,
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn detail_update_with_no_fields_fails_validation() {
        let id = DefendantId::new();
        let state = case_with_defendant(id);
        let err = state
            .handle(&CaseCommand::UpdateDefendantDetails {
                defendant_id: id,
                first_name: None,
                last_name: None,
                date_of_birth: None,
                occurred_at: Utc::now(),
                metadata: metadata(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
