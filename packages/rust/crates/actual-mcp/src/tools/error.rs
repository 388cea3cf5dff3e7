use actual_store::StoreError;
use thiserror::Error;

use crate::session_gate::InitError;

/// Per-call failure. Every variant ends up as `{"success": false, "error": ...}`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool '{0}' is disabled in read-only mode")]
    ReadOnly(String),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid arguments: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl ToolError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound(format!("{kind} '{id}' not found"))
    }

    /// Short machine label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::ReadOnly(_) => "policy",
            Self::Init(_) => "initialization",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Store(_) => "store",
        }
    }
}

impl From<StoreError> for ToolError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(message) => Self::NotFound(message),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_not_found() {
        let error = ToolError::from(StoreError::NotFound("transaction 'x' not found".into()));
        assert_eq!(error.kind(), "not_found");
        assert_eq!(error.to_string(), "transaction 'x' not found");
    }

    #[test]
    fn policy_message_names_the_tool() {
        let error = ToolError::ReadOnly("delete_transaction".into());
        assert_eq!(
            error.to_string(),
            "tool 'delete_transaction' is disabled in read-only mode"
        );
    }
}
