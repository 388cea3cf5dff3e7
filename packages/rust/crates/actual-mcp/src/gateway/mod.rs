//! Gateway namespace: stdio and HTTP entrypoints.

mod http;
mod stdio;

pub use http::{DEFAULT_HTTP_BIND, HealthResponse, MCP_PATH, router, run_http};
pub use stdio::run_stdio;
