use clap::{Parser, Subcommand};

use actual_mcp::{DEFAULT_HTTP_BIND, SettingsOverrides};

#[derive(Parser)]
#[command(name = "actual-mcp", version)]
#[command(
    about = "MCP server exposing an Actual budget as agent tools. Stdio, HTTP, or catalog dump."
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) settings: SettingsOverrides,

    /// Defaults to `stdio`.
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve MCP over stdin/stdout (logs go to stderr).
    Stdio,
    /// Serve MCP Streamable HTTP at /mcp, with GET /health.
    Http {
        /// Listen address (e.g. 127.0.0.1:8080)
        #[arg(long, env = "ACTUAL_MCP_BIND", default_value = DEFAULT_HTTP_BIND)]
        bind: String,
    },
    /// Print the tool catalog as JSON and exit. Needs no budget configuration.
    Tools,
}
