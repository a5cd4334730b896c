//! Appointment request workflow behind the new-appointment form.
//!
//! One submit attempt walks:
//!
//! ```text
//! Idle → Validating → ValidationFailed → Idle
//!                   → Submitting → Succeeded → NavigatedAway
//!                                → Failed → Idle
//!                                → Idle            (withheld / nothing created)
//! ```
//!
//! Mode alone decides the schema, the derived status and whether the backend
//! is called at all (`Dispatch`). Only `create` with a patient id reaches the
//! backend; `schedule` and `cancel` are reported as `DispatchGap::ModeNotWired`.
//! Backend failures are logged and kept in workflow state so the form can show
//! them and let the patient retry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::backend::{AppointmentBackend, BackendError, Navigator, PhysicianCatalog};
use crate::config::DEFAULT_PATIENTS_ROUTE;
use crate::form::FormLayout;
use crate::models::{
    AppointmentDraft, AppointmentRequest, AppointmentStatus, CallerIdentity, Mode,
};
use crate::validation::{select_schema, AppointmentSchema, BookingDetails, ValidDraft, ValidationErrors};

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowPhase {
    Idle,
    Validating,
    ValidationFailed,
    Submitting,
    Succeeded,
    Failed,
    NavigatedAway,
}

impl WorkflowPhase {
    pub fn is_loading(self) -> bool {
        self == WorkflowPhase::Submitting
    }
}

/// Why a valid draft was not sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "gap", rename_all = "camelCase")]
pub enum DispatchGap {
    /// `create` without a patient record to attach the appointment to.
    MissingPatient,
    /// No backend operation exists for this mode yet.
    ModeNotWired { mode: Mode },
}

/// Whether a submission in this mode, for this caller, calls the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    CreateAppointment { patient_id: String },
    Withheld(DispatchGap),
}

/// Backend failure as shown to the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailure {
    pub message: String,
    pub retryable: bool,
}

impl From<&BackendError> for SubmissionFailure {
    fn from(error: &BackendError) -> Self {
        Self {
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// Appointment stored; the form navigated to the success screen.
    #[serde(rename_all = "camelCase")]
    Navigated { appointment_id: String, path: String },
    /// Backend answered without creating anything.
    NothingCreated,
    /// Draft was valid but no backend call was made.
    Withheld { gap: DispatchGap },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Submission failed: {0}")]
    Submission(#[from] BackendError),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Appointment already submitted")]
    AlreadyNavigated,
}

/// Everything the rendering layer needs to draw the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub mode: Mode,
    pub status: AppointmentStatus,
    pub phase: WorkflowPhase,
    pub is_loading: bool,
    pub draft: AppointmentDraft,
    pub field_errors: Option<ValidationErrors>,
    pub failure: Option<SubmissionFailure>,
    pub navigated_to: Option<String>,
    pub transitions: Vec<WorkflowPhase>,
}

// ─── Pure steps ──────────────────────────────────────────────────────────────

/// Status recorded for the appointment; depends on mode only.
pub fn derive_status(mode: Mode) -> AppointmentStatus {
    mode.status()
}

pub fn resolve_dispatch(mode: Mode, identity: &CallerIdentity) -> Dispatch {
    match mode {
        Mode::Create => match identity.patient() {
            Some(patient_id) => Dispatch::CreateAppointment {
                patient_id: patient_id.to_string(),
            },
            None => Dispatch::Withheld(DispatchGap::MissingPatient),
        },
        Mode::Schedule | Mode::Cancel => Dispatch::Withheld(DispatchGap::ModeNotWired { mode }),
    }
}

pub fn build_request(
    user_id: &str,
    patient_id: &str,
    booking: BookingDetails,
    status: AppointmentStatus,
) -> AppointmentRequest {
    AppointmentRequest {
        user_id: user_id.to_string(),
        patient: patient_id.to_string(),
        primary_physician: booking.primary_physician,
        schedule: booking.schedule,
        reason: booking.reason,
        note: booking.note,
        status,
    }
}

/// `{route}/{user_id}/new-appointment/success?appointmentId={appointment_id}`
pub fn success_path(patients_route: &str, user_id: &str, appointment_id: &str) -> String {
    format!("{patients_route}/{user_id}/new-appointment/success?appointmentId={appointment_id}")
}

// ─── Workflow ────────────────────────────────────────────────────────────────

pub struct AppointmentWorkflow<B, N> {
    mode: Mode,
    identity: CallerIdentity,
    defaults: AppointmentDraft,
    draft: AppointmentDraft,
    phase: WorkflowPhase,
    transitions: Vec<WorkflowPhase>,
    field_errors: Option<ValidationErrors>,
    failure: Option<SubmissionFailure>,
    navigated_to: Option<String>,
    patients_route: String,
    backend: B,
    navigator: N,
}

impl<B: AppointmentBackend, N: Navigator> AppointmentWorkflow<B, N> {
    pub fn new(mode: Mode, identity: CallerIdentity, backend: B, navigator: N) -> Self {
        Self::opened_at(mode, identity, Utc::now(), backend, navigator)
    }

    /// Workflow whose form was opened at `opened_at` (the schedule default).
    pub fn opened_at(
        mode: Mode,
        identity: CallerIdentity,
        opened_at: DateTime<Utc>,
        backend: B,
        navigator: N,
    ) -> Self {
        let defaults = AppointmentDraft::opened_at(opened_at);
        tracing::debug!(mode = %mode, user_id = %identity.user_id, "Appointment form opened");
        Self {
            mode,
            identity,
            draft: defaults.clone(),
            defaults,
            phase: WorkflowPhase::Idle,
            transitions: vec![WorkflowPhase::Idle],
            field_errors: None,
            failure: None,
            navigated_to: None,
            patients_route: DEFAULT_PATIENTS_ROUTE.to_string(),
            backend,
            navigator,
        }
    }

    pub fn with_patients_route(mut self, route: impl Into<String>) -> Self {
        self.patients_route = route.into();
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    pub fn schema(&self) -> AppointmentSchema {
        select_schema(self.mode)
    }

    pub fn status(&self) -> AppointmentStatus {
        derive_status(self.mode)
    }

    pub fn dispatch(&self) -> Dispatch {
        resolve_dispatch(self.mode, &self.identity)
    }

    pub fn draft(&self) -> &AppointmentDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut AppointmentDraft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: AppointmentDraft) {
        self.draft = draft;
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// Every phase entered since the form opened, starting with `Idle`.
    pub fn transitions(&self) -> &[WorkflowPhase] {
        &self.transitions
    }

    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        self.field_errors.as_ref()
    }

    pub fn failure(&self) -> Option<&SubmissionFailure> {
        self.failure.as_ref()
    }

    pub fn navigated_to(&self) -> Option<&str> {
        self.navigated_to.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn layout(&self, catalog: &dyn PhysicianCatalog) -> FormLayout {
        FormLayout::for_mode(self.mode, catalog).with_loading(self.is_loading())
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            mode: self.mode,
            status: self.status(),
            phase: self.phase,
            is_loading: self.is_loading(),
            draft: self.draft.clone(),
            field_errors: self.field_errors.clone(),
            failure: self.failure.clone(),
            navigated_to: self.navigated_to.clone(),
            transitions: self.transitions.clone(),
        }
    }

    /// Run one submit attempt for the current draft.
    ///
    /// Validation happens before the loading phase; a rejected draft never
    /// sets it. Once past validation the workflow is `Submitting` until the
    /// attempt resolves, whatever the outcome. Dropping the returned future
    /// mid-call puts the workflow back to `Idle`.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, WorkflowError> {
        match self.phase {
            WorkflowPhase::Submitting => return Err(WorkflowError::SubmissionInFlight),
            WorkflowPhase::NavigatedAway => return Err(WorkflowError::AlreadyNavigated),
            _ => {}
        }

        self.field_errors = None;
        self.failure = None;
        self.transition(WorkflowPhase::Validating);

        let valid = match self.schema().validate(&self.draft) {
            Ok(valid) => valid,
            Err(errors) => {
                self.transition(WorkflowPhase::ValidationFailed);
                self.field_errors = Some(errors.clone());
                self.transition(WorkflowPhase::Idle);
                return Err(WorkflowError::Validation(errors));
            }
        };

        let status = derive_status(self.mode);
        self.transition(WorkflowPhase::Submitting);

        let mut attempt = InFlight { workflow: self };
        let outcome = attempt.workflow.dispatch_valid(valid, status).await;
        drop(attempt);
        outcome
    }

    async fn dispatch_valid(
        &mut self,
        valid: ValidDraft,
        status: AppointmentStatus,
    ) -> Result<SubmissionOutcome, WorkflowError> {
        let (patient_id, booking) = match (self.dispatch(), valid) {
            (Dispatch::CreateAppointment { patient_id }, ValidDraft::Booking(booking)) => {
                (patient_id, booking)
            }
            (Dispatch::Withheld(gap), _) => return Ok(self.withhold(gap)),
            (Dispatch::CreateAppointment { .. }, ValidDraft::Cancellation(_)) => {
                return Ok(self.withhold(DispatchGap::ModeNotWired { mode: self.mode }))
            }
        };

        let request = build_request(&self.identity.user_id, &patient_id, booking, status);
        tracing::info!(
            mode = %self.mode,
            status = %request.status,
            physician = %request.primary_physician,
            "Submitting appointment request"
        );

        match self.backend.create_appointment(request).await {
            Ok(Some(created)) => {
                self.transition(WorkflowPhase::Succeeded);
                self.draft = self.defaults.clone();

                let path = success_path(&self.patients_route, &self.identity.user_id, &created.id);
                self.navigator.navigate(&path);
                self.navigated_to = Some(path.clone());
                self.transition(WorkflowPhase::NavigatedAway);

                tracing::info!(appointment_id = %created.id, "Appointment created");
                Ok(SubmissionOutcome::Navigated {
                    appointment_id: created.id,
                    path,
                })
            }
            Ok(None) => {
                tracing::warn!(mode = %self.mode, "Backend returned no appointment");
                self.transition(WorkflowPhase::Idle);
                Ok(SubmissionOutcome::NothingCreated)
            }
            Err(error) => {
                tracing::error!(mode = %self.mode, error = %error, "Appointment submission failed");
                self.failure = Some(SubmissionFailure::from(&error));
                self.transition(WorkflowPhase::Failed);
                self.transition(WorkflowPhase::Idle);
                Err(WorkflowError::Submission(error))
            }
        }
    }

    fn withhold(&mut self, gap: DispatchGap) -> SubmissionOutcome {
        tracing::info!(mode = %self.mode, gap = ?gap, "Valid appointment draft not dispatched");
        self.transition(WorkflowPhase::Idle);
        SubmissionOutcome::Withheld { gap }
    }

    fn transition(&mut self, next: WorkflowPhase) {
        tracing::trace!(from = ?self.phase, to = ?next, "Workflow transition");
        self.phase = next;
        self.transitions.push(next);
    }
}

/// Held across the backend call. If the submit future is dropped before the
/// backend answers, the workflow goes back to `Idle` with the draft intact.
struct InFlight<'a, B: AppointmentBackend, N: Navigator> {
    workflow: &'a mut AppointmentWorkflow<B, N>,
}

impl<B: AppointmentBackend, N: Navigator> Drop for InFlight<'_, B, N> {
    fn drop(&mut self) {
        if self.workflow.phase == WorkflowPhase::Submitting {
            tracing::warn!(mode = %self.workflow.mode, "Appointment submission abandoned");
            self.workflow.transition(WorkflowPhase::Idle);
        }
    }
}
