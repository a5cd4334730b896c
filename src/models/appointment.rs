use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Values the patient edits on the new-appointment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentDraft {
    pub primary_physician: String,
    pub schedule: Option<DateTime<Utc>>,
    pub reason: String,
    pub note: String,
    pub cancellation_reason: String,
}

impl AppointmentDraft {
    /// Blank form with the schedule preset to `opened_at`.
    pub fn opened_at(opened_at: DateTime<Utc>) -> Self {
        Self {
            schedule: Some(opened_at),
            ..Self::default()
        }
    }
}

/// Who is submitting, and on behalf of which patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: String,
    pub patient_id: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>, patient_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            patient_id,
        }
    }

    /// Patient id as given, or `None` when missing or empty.
    pub fn patient(&self) -> Option<&str> {
        self.patient_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Normalized payload handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub user_id: String,
    pub patient: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

/// What the backend hands back for a stored appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAppointment {
    pub id: String,
}
