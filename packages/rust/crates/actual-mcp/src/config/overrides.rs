use std::path::PathBuf;

use clap::Args;

/// Global configuration flags. Each one can also come from its environment variable.
#[derive(Args, Clone, Default)]
pub struct SettingsOverrides {
    /// YAML settings file; flags and environment variables override its values.
    #[arg(long = "settings", env = "ACTUAL_MCP_SETTINGS", global = true)]
    pub settings_file: Option<PathBuf>,

    /// Local directory for budget data (default: ./.actual-data).
    #[arg(long, env = "ACTUAL_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the Actual HTTP API.
    #[arg(long, env = "ACTUAL_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// API credential.
    #[arg(long, env = "ACTUAL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Sync id of the budget to load.
    #[arg(long, env = "ACTUAL_BUDGET_SYNC_ID", global = true)]
    pub budget_id: Option<String>,

    /// Password for an end-to-end encrypted budget.
    #[arg(
        long,
        env = "ACTUAL_BUDGET_ENCRYPTION_PASSWORD",
        global = true,
        hide_env_values = true
    )]
    pub encryption_password: Option<String>,

    /// Refuse mutation tools. `--read-only` alone means true.
    #[arg(
        long,
        env = "ACTUAL_READ_ONLY",
        global = true,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_flag
    )]
    pub read_only: Option<bool>,

    /// Give up on session setup after this many seconds (0 or unset: wait forever).
    #[arg(long, env = "ACTUAL_INIT_TIMEOUT_SECS", global = true)]
    pub init_timeout_secs: Option<u64>,

    /// Per-request timeout against the budget server (default: 30).
    #[arg(long, env = "ACTUAL_REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,
}

/// Accepts the usual spellings of a boolean flag value.
pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Ok(true));
        assert_eq!(parse_flag(" on "), Ok(true));
        assert_eq!(parse_flag("0"), Ok(false));
        assert!(parse_flag("maybe").is_err());
    }
}
