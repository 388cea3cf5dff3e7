use std::time::Instant;

use serde_json::{Map, Value};

use super::catalog::{ToolDescriptor, ToolName, catalog};
use super::error::ToolError;
use super::handlers::{self, Fields};
use crate::session_gate::SessionGate;

/// Routes tool calls: policy check, session readiness, then the handler.
#[derive(Clone)]
pub struct ToolDispatcher {
    gate: SessionGate,
    read_only: bool,
}

/// Result of one tool call, ready to be wrapped as an envelope.
#[derive(Debug)]
pub struct ToolOutcome {
    pub tool: String,
    pub result: Result<Map<String, Value>, ToolError>,
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// `{"success": true, ...fields}` or `{"success": false, "error": message}`.
    #[must_use]
    pub fn envelope(&self) -> Value {
        let mut body = Map::new();
        match &self.result {
            Ok(fields) => {
                body.insert("success".to_string(), Value::Bool(true));
                body.extend(fields.clone());
            }
            Err(error) => {
                body.insert("success".to_string(), Value::Bool(false));
                body.insert("error".to_string(), Value::String(error.to_string()));
            }
        }
        Value::Object(body)
    }
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(gate: SessionGate, read_only: bool) -> Self {
        Self { gate, read_only }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        catalog()
    }

    /// Runs one call. Never panics on bad input; every failure comes back in the outcome.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolOutcome {
        let started = Instant::now();
        let result = self.run(name, arguments).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(_) => tracing::info!(
                event = "actual.tool.call.completed",
                tool = name,
                elapsed_ms,
                "tool call completed"
            ),
            Err(error) => tracing::warn!(
                event = "actual.tool.call.failed",
                tool = name,
                kind = error.kind(),
                elapsed_ms,
                error = %error,
                "tool call failed"
            ),
        }
        ToolOutcome {
            tool: name.to_string(),
            result,
        }
    }

    async fn run(&self, name: &str, arguments: Value) -> Result<Fields, ToolError> {
        let Some(tool) = ToolName::parse(name) else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        if self.read_only && tool.is_mutation() {
            return Err(ToolError::ReadOnly(name.to_string()));
        }
        let session = self.gate.ensure_ready().await?;
        handlers::invoke(tool, &session, arguments).await
    }
}
