//! Mode-specific validation for the new-appointment form.
//!
//! `select_schema` picks the required-field set for a mode:
//! - create / schedule: physician, schedule, reason (note optional)
//! - cancel: cancellation reason only
//!
//! Validation is synchronous and runs before any backend call. Failures are
//! returned as field-keyed messages using the form's field names.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AppointmentDraft, FormField, Mode};

/// Minimum characters for a physician selection.
const PHYSICIAN_MIN_CHARS: usize = 2;

/// Bounds for free-text reasons (appointment and cancellation).
const REASON_MIN_CHARS: usize = 2;
const REASON_MAX_CHARS: usize = 500;

const BOOKING_FIELDS: &[FormField] = &[
    FormField::PrimaryPhysician,
    FormField::Schedule,
    FormField::Reason,
];

const CANCELLATION_FIELDS: &[FormField] = &[FormField::CancellationReason];

// ─── Types ────────────────────────────────────────────────────────────────────

/// Field-level validation failure, keyed by form field name.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("Validation failed for {} field(s)", .fields.len())]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn messages(&self, field: FormField) -> &[String] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.fields.keys().copied()
    }
}

/// Validated create/schedule input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
}

/// Validated cancel input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationDetails {
    pub cancellation_reason: String,
}

/// Draft that passed its mode's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidDraft {
    Booking(BookingDetails),
    Cancellation(CancellationDetails),
}

/// Required-field rules for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentSchema {
    mode: Mode,
}

// ─── Schema selection ────────────────────────────────────────────────────────

pub fn select_schema(mode: Mode) -> AppointmentSchema {
    AppointmentSchema { mode }
}

impl AppointmentSchema {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn required_fields(&self) -> &'static [FormField] {
        match self.mode {
            Mode::Create | Mode::Schedule => BOOKING_FIELDS,
            Mode::Cancel => CANCELLATION_FIELDS,
        }
    }

    pub fn is_required(&self, field: FormField) -> bool {
        self.required_fields().contains(&field)
    }

    /// Check `draft` against this schema. Fields outside the schema are ignored.
    pub fn validate(&self, draft: &AppointmentDraft) -> Result<ValidDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let valid = match self.mode {
            Mode::Create | Mode::Schedule => {
                let physician = check_physician(&draft.primary_physician, &mut errors);
                let schedule = check_schedule(draft.schedule, &mut errors);
                let reason = check_reason(FormField::Reason, &draft.reason, &mut errors);
                let note = optional_text(&draft.note);

                match (physician, schedule, reason) {
                    (Some(primary_physician), Some(schedule), Some(reason)) => {
                        Some(ValidDraft::Booking(BookingDetails {
                            primary_physician,
                            schedule,
                            reason,
                            note,
                        }))
                    }
                    _ => None,
                }
            }
            Mode::Cancel => check_reason(
                FormField::CancellationReason,
                &draft.cancellation_reason,
                &mut errors,
            )
            .map(|cancellation_reason| {
                ValidDraft::Cancellation(CancellationDetails { cancellation_reason })
            }),
        };

        match valid {
            Some(valid) if errors.is_empty() => Ok(valid),
            _ => {
                tracing::debug!(
                    mode = %self.mode,
                    invalid_fields = errors.len(),
                    "Appointment draft rejected by schema"
                );
                Err(errors)
            }
        }
    }
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn check_physician(value: &str, errors: &mut ValidationErrors) -> Option<String> {
    let value = value.trim();
    if value.chars().count() < PHYSICIAN_MIN_CHARS {
        errors.add(FormField::PrimaryPhysician, "Select at least one doctor");
        return None;
    }
    Some(value.to_string())
}

fn check_schedule(
    value: Option<DateTime<Utc>>,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    if value.is_none() {
        errors.add(FormField::Schedule, "Select an appointment date");
    }
    value
}

fn check_reason(field: FormField, value: &str, errors: &mut ValidationErrors) -> Option<String> {
    let value = value.trim();
    let chars = value.chars().count();
    if chars < REASON_MIN_CHARS {
        errors.add(
            field,
            format!("Reason must be at least {REASON_MIN_CHARS} characters"),
        );
        return None;
    }
    if chars > REASON_MAX_CHARS {
        errors.add(
            field,
            format!("Reason must be at most {REASON_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(value.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 12, 10, 0, 0).unwrap()
    }

    fn booking_draft() -> AppointmentDraft {
        AppointmentDraft {
            primary_physician: "Jane Powell".into(),
            schedule: Some(at()),
            reason: "Annual monthly check-up".into(),
            note: String::new(),
            cancellation_reason: String::new(),
        }
    }

    #[test]
    fn cancel_schema_requires_only_cancellation_reason() {
        let schema = select_schema(Mode::Cancel);
        assert_eq!(schema.required_fields(), &[FormField::CancellationReason]);
        assert!(!schema.is_required(FormField::PrimaryPhysician));
        assert!(!schema.is_required(FormField::Schedule));
        assert!(!schema.is_required(FormField::Reason));
    }

    #[test]
    fn booking_schemas_require_physician_schedule_reason() {
        for mode in [Mode::Create, Mode::Schedule] {
            let schema = select_schema(mode);
            assert!(schema.is_required(FormField::PrimaryPhysician));
            assert!(schema.is_required(FormField::Schedule));
            assert!(schema.is_required(FormField::Reason));
            assert!(!schema.is_required(FormField::Note));
            assert!(!schema.is_required(FormField::CancellationReason));
        }
    }

    #[test]
    fn create_accepts_empty_note() {
        let valid = select_schema(Mode::Create).validate(&booking_draft()).unwrap();
        match valid {
            ValidDraft::Booking(details) => {
                assert_eq!(details.primary_physician, "Jane Powell");
                assert_eq!(details.schedule, at());
                assert_eq!(details.note, None);
            }
            other => panic!("expected booking, got {other:?}"),
        }
    }

    #[test]
    fn note_is_trimmed_and_kept() {
        let mut draft = booking_draft();
        draft.note = "  prefers mornings ".into();
        let ValidDraft::Booking(details) = select_schema(Mode::Schedule).validate(&draft).unwrap()
        else {
            panic!("expected booking");
        };
        assert_eq!(details.note.as_deref(), Some("prefers mornings"));
    }

    #[test]
    fn create_rejects_empty_reason() {
        let mut draft = booking_draft();
        draft.reason = String::new();
        let errors = select_schema(Mode::Create).validate(&draft).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.messages(FormField::Reason),
            &["Reason must be at least 2 characters".to_string()]
        );
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errors = select_schema(Mode::Create)
            .validate(&AppointmentDraft::default())
            .unwrap_err();
        let fields: Vec<FormField> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![FormField::PrimaryPhysician, FormField::Schedule, FormField::Reason]
        );
        assert_eq!(
            errors.messages(FormField::PrimaryPhysician),
            &["Select at least one doctor".to_string()]
        );
    }

    #[test]
    fn whitespace_reason_counts_as_missing() {
        let mut draft = booking_draft();
        draft.reason = "    ".into();
        let errors = select_schema(Mode::Schedule).validate(&draft).unwrap_err();
        assert!(errors.contains(FormField::Reason));
    }

    #[test]
    fn overlong_reason_rejected() {
        let mut draft = booking_draft();
        draft.reason = "x".repeat(REASON_MAX_CHARS + 1);
        let errors = select_schema(Mode::Create).validate(&draft).unwrap_err();
        assert_eq!(
            errors.messages(FormField::Reason),
            &["Reason must be at most 500 characters".to_string()]
        );

        draft.reason = "x".repeat(REASON_MAX_CHARS);
        assert!(select_schema(Mode::Create).validate(&draft).is_ok());
    }

    #[test]
    fn cancel_ignores_booking_fields() {
        let draft = AppointmentDraft {
            cancellation_reason: "Feeling better".into(),
            ..AppointmentDraft::default()
        };
        let valid = select_schema(Mode::Cancel).validate(&draft).unwrap();
        assert_eq!(
            valid,
            ValidDraft::Cancellation(CancellationDetails {
                cancellation_reason: "Feeling better".into()
            })
        );
    }

    #[test]
    fn cancel_requires_cancellation_reason() {
        let errors = select_schema(Mode::Cancel).validate(&booking_draft()).unwrap_err();
        let fields: Vec<FormField> = errors.fields().collect();
        assert_eq!(fields, vec![FormField::CancellationReason]);
    }

    #[test]
    fn errors_serialize_by_field_name() {
        let errors = select_schema(Mode::Cancel)
            .validate(&AppointmentDraft::default())
            .unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json["cancellationReason"][0],
            "Reason must be at least 2 characters"
        );
    }
}
