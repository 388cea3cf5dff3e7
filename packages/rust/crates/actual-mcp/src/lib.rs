//! MCP server over an Actual budget.
//!
//! - **Session gate**: the budget session opens lazily on the first tool call, exactly once,
//!   shared by every concurrent caller; a failed setup stays failed until shutdown.
//! - **Tools**: accounts, categories, payees, transactions, monthly budgets, spending
//!   reports and guarded mutations, answered as `{"success": ..}` JSON envelopes.
//! - **Gateways**: MCP over stdio, or Streamable HTTP at `/mcp` with a `/health` check.

#![allow(missing_docs)]

mod config;
mod gateway;
mod server;
mod session_gate;
mod tools;

pub use config::{
    ConfigError, DEFAULT_DATA_DIR, DEFAULT_REQUEST_TIMEOUT_SECS, ServerSettings, SettingsFile,
    SettingsOverrides, load_settings_file, parse_flag,
};
pub use gateway::{DEFAULT_HTTP_BIND, HealthResponse, MCP_PATH, router, run_http, run_stdio};
pub use server::ActualMcpServer;
pub use session_gate::{
    BudgetSession, GateStatus, InitError, SessionGate, SessionSetup, SetupFailure,
};
pub use tools::{
    CreateTransactionParams, DeleteTransactionParams, GetAccountBalanceParams, GetAccountsParams,
    GetBudgetMonthParams, GetCategoriesParams, GetCategoryBalanceParams, GetPayeesParams,
    GetSpendingByCategoryParams, GetTransactionsParams, RunBankSyncParams, SetBudgetAmountParams,
    ToolDescriptor, ToolDispatcher, ToolError, ToolName, ToolOutcome, UpdateTransactionParams,
    catalog,
};
