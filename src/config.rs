use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Careline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Route the success screen hangs under: `{route}/{user_id}/new-appointment/success`.
pub const DEFAULT_PATIENTS_ROUTE: &str = "/patients";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Get the application data directory
/// ~/Careline/ on all platforms, falling back to the working directory
/// when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    app_data_dir().join("config.json")
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,careline_lib=debug"
}

/// Settings read from `config.json`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub log_filter: String,
    pub patients_route: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter().to_string(),
            patients_route: DEFAULT_PATIENTS_ROUTE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // "/patients/" and "/patients" must build the same path
        let trimmed = config.patients_route.trim_end_matches('/');
        config.patients_route = if trimmed.is_empty() {
            DEFAULT_PATIENTS_ROUTE.to_string()
        } else {
            trimmed.to_string()
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("Careline"));
    }

    #[test]
    fn config_path_under_app_data() {
        let path = config_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("config.json"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.patients_route, "/patients");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"patientsRoute": "/clinic/patients/"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.patients_route, "/clinic/patients");
        assert_eq!(config.log_filter, default_log_filter());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
