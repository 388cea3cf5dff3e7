//! HTTP gateway: MCP Streamable HTTP at `/mcp`, plus `GET /health`.

use std::sync::Arc;

use anyhow::Result;
use axum::{Json, Router, extract::State, routing::get};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::server::ActualMcpServer;
use crate::tools::ToolDispatcher;

/// Mount point of the MCP endpoint.
pub const MCP_PATH: &str = "/mcp";
/// Default listen address for `actual-mcp http`.
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub read_only: bool,
    /// Session gate state: `uninitialized`, `initializing`, `ready` or `failed`.
    pub session: &'static str,
    pub tools: usize,
}

async fn handle_health(State(dispatcher): State<ToolDispatcher>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        read_only: dispatcher.read_only(),
        session: dispatcher.gate().state().as_str(),
        tools: dispatcher.tools().len(),
    })
}

/// Build the gateway router. Each MCP session gets a clone of `server`; all clones
/// share one session gate.
pub fn router(server: ActualMcpServer, cancellation: &CancellationToken) -> Router {
    let dispatcher = server.dispatcher().clone();
    let mcp: StreamableHttpService<ActualMcpServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(server.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: cancellation.child_token(),
                ..Default::default()
            },
        );
    Router::new()
        .route("/health", get(handle_health))
        .with_state(dispatcher)
        .nest_service(MCP_PATH, mcp)
}

/// Serve until Ctrl+C (SIGINT) or SIGTERM; in-flight requests complete before exit.
pub async fn run_http(server: ActualMcpServer, bind_addr: &str) -> Result<()> {
    let cancellation = CancellationToken::new();
    let app = router(server, &cancellation);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(
        event = "actual.gateway.http.listening",
        bind_addr,
        mcp_path = MCP_PATH,
        "gateway listening (Ctrl+C/SIGTERM to stop)"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            cancellation.cancel();
        })
        .await?;
    tracing::info!(event = "actual.gateway.http.stopped", "gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "SIGTERM handler unavailable; waiting for Ctrl+C"
                );
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
