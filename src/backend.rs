//! Collaborators the appointment workflow talks to.
//!
//! Three traits define the boundaries:
//! - AppointmentBackend: stores a new appointment and returns its id
//! - Navigator: moves the user to another screen
//! - PhysicianCatalog: doctors offered in the physician selector
//!
//! In-process implementations back the driver binary and the tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::models::{default_physicians, AppointmentRequest, CreatedAppointment, Physician};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Appointment service unavailable: {0}")]
    Unavailable(String),

    #[error("Appointment rejected: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Whether resubmitting the same draft can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Persists appointment requests. `Ok(None)` means the call went through
/// but nothing was created.
pub trait AppointmentBackend: Send + Sync {
    fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> impl Future<Output = Result<Option<CreatedAppointment>, BackendError>> + Send;
}

/// Fire-and-forget route change.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Read-only list of selectable physicians.
pub trait PhysicianCatalog: Send + Sync {
    fn physicians(&self) -> Vec<Physician>;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// An appointment accepted by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAppointment {
    pub id: String,
    pub request: AppointmentRequest,
}

#[derive(Debug, Default)]
struct BackendState {
    stored: Vec<StoredAppointment>,
    scripted_failures: VecDeque<BackendError>,
    empty_responses: usize,
}

/// Keeps appointments in process memory. Failures and empty responses can be
/// queued up front; they are consumed one call at a time, before any store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: AsyncMutex<BackendState>,
    calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next call fails with `error`.
    pub fn fail_next(mut self, error: BackendError) -> Self {
        self.state.get_mut().scripted_failures.push_back(error);
        self
    }

    /// Next call succeeds without creating anything.
    pub fn respond_empty_next(mut self) -> Self {
        self.state.get_mut().empty_responses += 1;
        self
    }

    /// Number of `create_appointment` calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Vec<StoredAppointment> {
        self.state.lock().await.stored.clone()
    }
}

impl AppointmentBackend for InMemoryBackend {
    async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<Option<CreatedAppointment>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;

        if let Some(error) = state.scripted_failures.pop_front() {
            return Err(error);
        }
        if state.empty_responses > 0 {
            state.empty_responses -= 1;
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        tracing::debug!(appointment_id = %id, status = %request.status, "Stored appointment");
        state.stored.push(StoredAppointment {
            id: id.clone(),
            request,
        });
        Ok(Some(CreatedAppointment { id }))
    }
}

// ─── Navigators ──────────────────────────────────────────────────────────────

/// Remembers every path it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

/// Logs the destination; used by the driver binary where there is no router.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigating");
    }
}

// ─── Physician catalog ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    physicians: Vec<Physician>,
}

impl StaticCatalog {
    pub fn new(physicians: Vec<Physician>) -> Self {
        Self { physicians }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(default_physicians())
    }
}

impl PhysicianCatalog for StaticCatalog {
    fn physicians(&self) -> Vec<Physician> {
        self.physicians.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use chrono::{TimeZone, Utc};

    fn request() -> AppointmentRequest {
        AppointmentRequest {
            user_id: "user-1".into(),
            patient: "patient-1".into(),
            primary_physician: "Evan Peter".into(),
            schedule: Utc.with_ymd_and_hms(2026, 5, 4, 8, 15, 0).unwrap(),
            reason: "Persistent cough".into(),
            note: None,
            status: AppointmentStatus::Pending,
        }
    }

    #[tokio::test]
    async fn in_memory_backend_stores_and_returns_id() {
        let backend = InMemoryBackend::new();
        let created = backend.create_appointment(request()).await.unwrap().unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());

        let stored = backend.stored().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.id);
        assert_eq!(stored[0].request, request());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn scripted_failure_consumed_once() {
        let backend = InMemoryBackend::new().fail_next(BackendError::Unavailable("offline".into()));
        let err = backend.create_appointment(request()).await.unwrap_err();
        assert_eq!(err, BackendError::Unavailable("offline".into()));
        assert!(backend.stored().await.is_empty());

        assert!(backend.create_appointment(request()).await.unwrap().is_some());
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_response_creates_nothing() {
        let backend = InMemoryBackend::new().respond_empty_next();
        assert_eq!(backend.create_appointment(request()).await.unwrap(), None);
        assert!(backend.stored().await.is_empty());
    }

    #[test]
    fn retryable_errors() {
        assert!(BackendError::Unavailable("timeout".into()).is_retryable());
        assert!(!BackendError::Rejected("duplicate".into()).is_retryable());
    }

    #[test]
    fn recording_navigator_keeps_order() {
        let nav = RecordingNavigator::new();
        nav.navigate("/a");
        nav.navigate("/b");
        assert_eq!(nav.history(), vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(nav.last().as_deref(), Some("/b"));
    }

    #[test]
    fn recording_navigator_survives_poisoned_lock() {
        let nav = std::sync::Arc::new(RecordingNavigator::new());
        nav.navigate("/before");

        let poisoner = std::sync::Arc::clone(&nav);
        let joined = std::thread::spawn(move || {
            let _held = poisoner.history.lock().unwrap();
            panic!("poison the history lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(nav.history.is_poisoned());

        nav.navigate("/after");
        assert_eq!(nav.history(), vec!["/before".to_string(), "/after".to_string()]);
    }

    #[test]
    fn static_catalog_defaults_to_nine_physicians() {
        let physicians = StaticCatalog::default().physicians();
        assert_eq!(physicians.len(), 9);
        assert_eq!(physicians[0].name, "John Green");
        assert!(physicians.iter().all(|p| p.image.starts_with("/assets/images/")));
    }

    #[test]
    fn navigator_and_catalog_are_object_safe() {
        fn _assert_navigator(_: &dyn Navigator) {}
        fn _assert_catalog(_: &dyn PhysicianCatalog) {}
    }
}
