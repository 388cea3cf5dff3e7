//! Budget store client for actual-mcp.
//!
//! The store is the external data-access surface behind every tool: it opens a session,
//! loads one budget, and then serves accounts, categories, payees, transactions, and
//! monthly budget figures. [`BudgetStore`] is the seam; [`HttpBudgetStore`] talks to an
//! Actual HTTP API bridge, and [`test_support::FakeBudgetStore`] backs the tests.
//!
//! Money inside this crate is always integer minor units (cents).

mod config;
mod error;
mod http;
mod model;
mod store;
#[doc(hidden)]
pub mod test_support;

pub use config::OpenConfig;
pub use error::{StoreError, StoreResult};
pub use http::HttpBudgetStore;
pub use model::{
    Account, BudgetMonth, BudgetMonthCategory, BudgetMonthGroup, Category, CategoryGroup,
    NewTransaction, Payee, Transaction, TransactionPatch,
};
pub use store::BudgetStore;
