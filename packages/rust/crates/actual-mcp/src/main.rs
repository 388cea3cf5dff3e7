//! actual-mcp CLI: stdio (default) or http gateway, or `tools` to print the catalog.
//!
//! Logging: `RUST_LOG` overrides the default `actual_mcp=info,actual_store=info`; logs
//! always go to stderr so stdout stays free for MCP stdio framing.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use actual_mcp::{
    ActualMcpServer, ServerSettings, SessionGate, ToolDispatcher, catalog, run_http, run_stdio,
};
use actual_store::{BudgetStore, HttpBudgetStore};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("actual_mcp=info,actual_store=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let command = cli.command.unwrap_or(Command::Stdio);
    if matches!(command, Command::Tools) {
        println!("{}", serde_json::to_string_pretty(&catalog())?);
        return Ok(());
    }

    let settings = match ServerSettings::resolve(cli.settings) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(
                event = "actual.config.invalid",
                error = %error,
                "refusing to start"
            );
            std::process::exit(1);
        }
    };
    tracing::info!(
        event = "actual.server.starting",
        server_url = %settings.server_url,
        budget_id = %settings.budget_id,
        data_dir = %settings.data_dir.display(),
        read_only = settings.read_only,
        "starting actual-mcp"
    );

    let store: Arc<dyn BudgetStore> = Arc::new(HttpBudgetStore::new());
    let gate = SessionGate::new(store, settings.session_setup());
    let server = ActualMcpServer::new(ToolDispatcher::new(gate.clone(), settings.read_only));

    let served = match command {
        Command::Http { bind } => run_http(server, &bind).await,
        Command::Stdio | Command::Tools => run_stdio(server).await,
    };

    if let Err(error) = gate.shutdown().await {
        tracing::warn!(
            event = "actual.session.close_failed",
            error = %error,
            "failed to close budget session"
        );
    }
    served
}
