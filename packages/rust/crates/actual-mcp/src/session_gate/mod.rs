//! Lazy, at-most-once initialization of the budget session.
//!
//! Every tool call goes through [`SessionGate::ensure_ready`]. The first caller starts
//! the setup (open the store, authenticate, load the budget) on its own task; everyone
//! who arrives while it runs waits on the same attempt and sees the same outcome. A
//! failed setup stays failed until [`SessionGate::shutdown`] clears it.

mod core;
mod types;

pub use types::{BudgetSession, GateStatus, InitError, SessionGate, SessionSetup, SetupFailure};
