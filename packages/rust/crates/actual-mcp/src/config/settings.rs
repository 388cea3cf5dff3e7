//! Optional YAML settings file (`--settings` / `ACTUAL_MCP_SETTINGS`).
//!
//! Keys mirror the CLI flags in snake case. Flags and environment variables win
//! over anything set here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub data_dir: Option<PathBuf>,
    pub server_url: Option<String>,
    pub password: Option<String>,
    pub budget_id: Option<String>,
    pub encryption_password: Option<String>,
    pub read_only: Option<bool>,
    pub init_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// Reads and parses a settings file. A missing or malformed file is an error; the
/// caller asked for it explicitly.
pub fn load_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(SettingsFile::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
