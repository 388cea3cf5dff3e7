//! Stdio gateway: MCP framing on stdin/stdout. Logs must stay on stderr.

use anyhow::Result;
use rmcp::ServiceExt;

use crate::server::ActualMcpServer;

/// Serve one MCP client over stdio until it disconnects.
pub async fn run_stdio(server: ActualMcpServer) -> Result<()> {
    tracing::info!(
        event = "actual.gateway.stdio.started",
        "serving MCP over stdio"
    );
    let service = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| anyhow::anyhow!("MCP handshake: {e}"))?;
    service.waiting().await?;
    tracing::info!(
        event = "actual.gateway.stdio.stopped",
        "stdio client disconnected"
    );
    Ok(())
}
