//! Startup configuration: flags and environment over an optional YAML file.

mod overrides;
mod settings;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use actual_store::OpenConfig;
use thiserror::Error;

use crate::session_gate::SessionSetup;

pub use overrides::{SettingsOverrides, parse_flag};
pub use settings::{SettingsFile, load_settings_file};

/// Default local data directory.
pub const DEFAULT_DATA_DIR: &str = "./.actual-data";
/// Default per-request timeout against the budget server.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration problems. All of them stop the process before it serves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Fully resolved server settings.
#[derive(Clone)]
pub struct ServerSettings {
    pub data_dir: PathBuf,
    pub server_url: String,
    pub password: String,
    pub budget_id: String,
    pub encryption_password: Option<String>,
    pub read_only: bool,
    pub init_timeout: Option<Duration>,
    pub request_timeout: Duration,
}

impl fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSettings")
            .field("data_dir", &self.data_dir)
            .field("server_url", &self.server_url)
            .field("password", &"<redacted>")
            .field("budget_id", &self.budget_id)
            .field(
                "encryption_password",
                &self.encryption_password.as_ref().map(|_| "<redacted>"),
            )
            .field("read_only", &self.read_only)
            .field("init_timeout", &self.init_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ServerSettings {
    /// Resolves settings from flags/environment plus the settings file they name.
    pub fn resolve(overrides: SettingsOverrides) -> Result<Self, ConfigError> {
        let file = match overrides.settings_file.as_deref() {
            Some(path) => load_settings_file(path)?,
            None => SettingsFile::default(),
        };
        Self::from_sources(overrides, file)
    }

    /// Merges already loaded sources; `overrides` wins field by field.
    pub fn from_sources(
        overrides: SettingsOverrides,
        file: SettingsFile,
    ) -> Result<Self, ConfigError> {
        let server_url = non_empty(overrides.server_url.or(file.server_url));
        let password = non_empty(overrides.password.or(file.password));
        let budget_id = non_empty(overrides.budget_id.or(file.budget_id));

        let (Some(server_url), Some(password), Some(budget_id)) =
            (server_url.clone(), password.clone(), budget_id.clone())
        else {
            let mut missing = Vec::new();
            if server_url.is_none() {
                missing.push("ACTUAL_SERVER_URL");
            }
            if password.is_none() {
                missing.push("ACTUAL_PASSWORD");
            }
            if budget_id.is_none() {
                missing.push("ACTUAL_BUDGET_SYNC_ID");
            }
            return Err(ConfigError::Missing(missing));
        };

        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "ACTUAL_SERVER_URL",
                reason: format!("expected an http(s) URL, got '{server_url}'"),
            });
        }

        let request_timeout_secs = overrides
            .request_timeout_secs
            .or(file.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "ACTUAL_REQUEST_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let init_timeout = overrides
            .init_timeout_secs
            .or(file.init_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            data_dir: overrides
                .data_dir
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            server_url,
            password,
            budget_id,
            encryption_password: non_empty(
                overrides.encryption_password.or(file.encryption_password),
            ),
            read_only: overrides.read_only.or(file.read_only).unwrap_or(false),
            init_timeout,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    #[must_use]
    pub fn open_config(&self) -> OpenConfig {
        let mut open = OpenConfig::new(
            self.data_dir.clone(),
            self.server_url.clone(),
            self.password.clone(),
        );
        open.encryption_password.clone_from(&self.encryption_password);
        open.request_timeout = self.request_timeout;
        open
    }

    #[must_use]
    pub fn session_setup(&self) -> SessionSetup {
        SessionSetup {
            open: self.open_config(),
            budget_id: self.budget_id.clone(),
            timeout: self.init_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secrets() {
        let settings = ServerSettings::from_sources(
            SettingsOverrides {
                server_url: Some("http://localhost:5007".into()),
                password: Some("hunter2".into()),
                budget_id: Some("b".into()),
                encryption_password: Some("vault".into()),
                ..SettingsOverrides::default()
            },
            SettingsFile::default(),
        )
        .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("vault"));
        assert!(rendered.contains("<redacted>"));
    }
}
