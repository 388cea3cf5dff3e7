//! Connection settings consumed by [`crate::BudgetStore::open`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything a store needs to open a session. Secrets are redacted in `Debug`.
#[derive(Clone)]
pub struct OpenConfig {
    /// Local directory the store may use for session data.
    pub data_dir: PathBuf,
    /// Base URL of the budget server (e.g. `http://localhost:5007`).
    pub server_url: String,
    /// Server credential.
    pub password: String,
    /// Optional end-to-end encryption password for the budget file.
    pub encryption_password: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl OpenConfig {
    /// Config with the default request timeout and no encryption password.
    #[must_use]
    pub fn new(
        data_dir: impl Into<PathBuf>,
        server_url: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            server_url: server_url.into(),
            password: password.into(),
            encryption_password: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for OpenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenConfig")
            .field("data_dir", &self.data_dir)
            .field("server_url", &self.server_url)
            .field("password", &"<redacted>")
            .field(
                "encryption_password",
                &self.encryption_password.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = OpenConfig::new("/tmp/actual", "http://localhost:5007", "hunter2");
        config.encryption_password = Some("s3cret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("http://localhost:5007"));
    }
}
