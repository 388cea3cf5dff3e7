//! Store error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`crate::BudgetStore`].
///
/// Display strings carry the remote message as-is so callers can surface the
/// original cause (for example `bad credential`) without rewording it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server rejected the credential.
    #[error("{0}")]
    Auth(String),

    /// A budget, account, category, or transaction does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Any other non-success response from the server.
    #[error("budget server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The server could not be reached or the request did not complete.
    #[error("budget server unreachable: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("unexpected budget server response: {0}")]
    Decode(String),

    /// The local data directory could not be prepared.
    #[error("data directory {path:?} unusable: {reason}")]
    DataDir {
        /// Configured data directory.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A data call arrived before `load_budget` succeeded (or after `close`).
    #[error("no budget loaded")]
    NotLoaded,
}

impl StoreError {
    /// True for lookups that missed; used to classify per-call failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}
