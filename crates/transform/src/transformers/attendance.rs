//! Attendance-day reshaping.
//!
//! Old releases recorded hearing attendance as a boolean
//! (`isInAttendance`); the current schema records an attendance type
//! (`attendanceType`). `true` maps to `IN_PERSON`, `false` to `NOT_PRESENT`.

use serde_json::{json, Map, Value as JsonValue};

use casefold_events::EventEnvelope;

use crate::action::{Action, ActionKind};
use crate::error::TransformError;
use crate::path::{render, PathPattern};
use crate::rewrite::{any_node, rewrite};
use crate::scope::EventScope;
use crate::transformer::Transformer;

/// Where the attendance-day records live inside the payload.
pub const ATTENDANCE_DAY_PATH: &str = "hearing.defendantAttendance.#.attendanceDays.#";

const LEGACY_FIELD: &str = "isInAttendance";
const CURRENT_FIELD: &str = "attendanceType";

pub struct AttendanceDayReshape {
    scope: EventScope,
    at: PathPattern,
}

impl AttendanceDayReshape {
    pub fn new(scope: EventScope) -> Self {
        Self {
            scope,
            at: PathPattern::parse(ATTENDANCE_DAY_PATH),
        }
    }
}

impl Transformer for AttendanceDayReshape {
    fn id(&self) -> &'static str {
        "attendance-day-reshape"
    }

    fn classify(&self, envelope: &EventEnvelope) -> ActionKind {
        if !self.scope.admits(envelope) {
            return ActionKind::NoAction;
        }
        // Already migrated once no day record carries the legacy boolean.
        let legacy_left = any_node(envelope.payload(), self.at.matcher(), |day| {
            day.get(LEGACY_FIELD).is_some()
        });
        if legacy_left {
            ActionKind::Transform
        } else {
            ActionKind::NoAction
        }
    }

    fn apply(&self, envelope: &EventEnvelope) -> Result<Action, TransformError> {
        let payload = rewrite(envelope.payload(), self.at.matcher(), |path, node| {
            let map = match node {
                JsonValue::Object(map) => map,
                other => return Err(TransformError::type_mismatch(render(path), "object", other)),
            };

            let attendance_type = match map.get(LEGACY_FIELD) {
                // This particular day was already reshaped.
                None => return Ok(node.clone()),
                Some(JsonValue::Bool(true)) => "IN_PERSON",
                Some(JsonValue::Bool(false)) => "NOT_PRESENT",
                Some(other) => {
                    let field_path = format!("{}.{LEGACY_FIELD}", render(path));
                    return Err(TransformError::type_mismatch(field_path, "bool", other));
                }
            };

            // Replace the legacy field in place, preserving key order.
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                if key == LEGACY_FIELD {
                    out.insert(CURRENT_FIELD.to_string(), json!(attendance_type));
                } else {
                    out.insert(key.clone(), value.clone());
                }
            }
            Ok(JsonValue::Object(out))
        })?;

        Ok(Action::Transform(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ScopeEntry;
    use casefold_core::{CausationId, CorrelationId, StreamId, UserId};
    use chrono::Utc;
    use uuid::Uuid;

    fn scope() -> EventScope {
        EventScope::from_entry(&ScopeEntry::for_events(["hearing.attendance-updated"]))
    }

    fn envelope(payload: JsonValue) -> EventEnvelope {
        EventEnvelope::new(
            Uuid::now_v7(),
            StreamId::new(),
            2,
            "hearing.attendance-updated",
            Utc::now(),
            CausationId::new(),
            CorrelationId::new(),
            UserId::new(),
            payload,
        )
    }

    fn legacy_payload(is_in_attendance: JsonValue) -> JsonValue {
        json!({
            "hearing": {
                "defendantAttendance": [{
                    "defendantId": "c4b1a570-50a0-7cc0-8000-000000000001",
                    "attendanceDays": [{
                        "day": "2021-01-01",
                        "isInAttendance": is_in_attendance,
                    }]
                }]
            }
        })
    }

    #[test]
    fn true_becomes_in_person() {
        let t = AttendanceDayReshape::new(scope());
        let env = envelope(legacy_payload(json!(true)));

        assert_eq!(t.classify(&env), ActionKind::Transform);
        let action = t.apply(&env).unwrap();
        let Action::Transform(payload) = action else {
            panic!("expected Transform");
        };
        let day = &payload["hearing"]["defendantAttendance"][0]["attendanceDays"][0];
        assert_eq!(day, &json!({"day": "2021-01-01", "attendanceType": "IN_PERSON"}));
    }

    #[test]
    fn false_becomes_not_present() {
        let t = AttendanceDayReshape::new(scope());
        let env = envelope(legacy_payload(json!(false)));

        let Action::Transform(payload) = t.apply(&env).unwrap() else {
            panic!("expected Transform");
        };
        let day = &payload["hearing"]["defendantAttendance"][0]["attendanceDays"][0];
        assert_eq!(day["attendanceType"], "NOT_PRESENT");
    }

    #[test]
    fn non_bool_attendance_flag_is_a_type_mismatch() {
        let t = AttendanceDayReshape::new(scope());
        let env = envelope(legacy_payload(json!("yes")));

        let err = t.apply(&env).unwrap_err();
        match err {
            TransformError::TypeMismatch { path, expected, found } => {
                assert_eq!(
                    path,
                    "hearing.defendantAttendance.0.attendanceDays.0.isInAttendance"
                );
                assert_eq!(expected, "bool");
                assert_eq!(found, "string");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn already_migrated_payload_is_no_action() {
        let t = AttendanceDayReshape::new(scope());
        let env = envelope(json!({
            "hearing": {
                "defendantAttendance": [{
                    "attendanceDays": [{"day": "2021-01-01", "attendanceType": "IN_PERSON"}]
                }]
            }
        }));
        assert_eq!(t.classify(&env), ActionKind::NoAction);
    }

    #[test]
    fn reapplying_own_output_is_inert() {
        let t = AttendanceDayReshape::new(scope());
        let env = envelope(legacy_payload(json!(true)));

        let Action::Transform(payload) = t.apply(&env).unwrap() else {
            panic!("expected Transform");
        };
        let migrated = env.with_payload(payload);
        assert_eq!(t.classify(&migrated), ActionKind::NoAction);
    }
}
