pub mod backend; // Backend, navigator and physician catalog seams
pub mod config;
pub mod form; // Per-mode field layout and submit button
pub mod models;
pub mod validation; // Mode-specific schema
pub mod workflow; // Submission state machine

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use backend::{InMemoryBackend, TracingNavigator};
use config::{AppConfig, ConfigError};
use models::{AppointmentDraft, CallerIdentity, Mode, ModelError};
use workflow::{AppointmentWorkflow, SubmissionOutcome, WorkflowSnapshot};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown appointment mode: {0}")]
    Mode(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One form submission, as read by the driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommand {
    pub mode: String,
    pub user_id: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub draft: AppointmentDraft,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub outcome: Option<SubmissionOutcome>,
    pub error: Option<String>,
    pub snapshot: WorkflowSnapshot,
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `fallback`.
/// Call once per process.
pub fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run `command` through a fresh workflow backed by process memory.
///
/// Validation and backend failures end up in the report; only a mode that
/// is not `create`, `cancel` or `schedule` is an error.
pub async fn run_command(command: SubmitCommand, config: &AppConfig) -> Result<RunReport, RunError> {
    let mode: Mode = command.mode.parse()?;
    let identity = CallerIdentity::new(command.user_id, command.patient_id);

    let mut workflow = AppointmentWorkflow::new(mode, identity, InMemoryBackend::new(), TracingNavigator)
        .with_patients_route(config.patients_route.clone());

    let mut draft = command.draft;
    if draft.schedule.is_none() {
        draft.schedule = workflow.draft().schedule;
    }
    workflow.set_draft(draft);

    let (outcome, error) = match workflow.submit().await {
        Ok(outcome) => (Some(outcome), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok(RunReport {
        outcome,
        error,
        snapshot: workflow.snapshot(),
    })
}

/// Driver entry point: one JSON submit command on stdin, report on stdout.
pub async fn run() -> Result<(), RunError> {
    let config = AppConfig::load(&config::config_path())?;
    init_tracing(&config.log_filter);

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let command: SubmitCommand = serde_json::from_str(&input)?;

    let report = run_command(command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
