//! The data-access seam every tool handler goes through.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::OpenConfig;
use crate::error::StoreResult;
use crate::model::{
    Account, BudgetMonth, CategoryGroup, NewTransaction, Payee, Transaction, TransactionPatch,
};

/// External budget store: session lifecycle plus the read/write surface.
///
/// Lifecycle is `open` → `load_budget` → data calls → `close`. Data calls made
/// before a budget is loaded fail with [`crate::StoreError::NotLoaded`].
/// Months are `YYYY-MM`; amounts are cents.
#[async_trait]
pub trait BudgetStore: Send + Sync + 'static {
    /// Prepare the local data directory and authenticate against the server.
    async fn open(&self, config: &OpenConfig) -> StoreResult<()>;

    /// Load one budget by its sync id.
    async fn load_budget(&self, budget_id: &str) -> StoreResult<()>;

    /// Release the session. Closing an unopened store is not an error.
    async fn close(&self) -> StoreResult<()>;

    /// All accounts, open and closed.
    async fn accounts(&self) -> StoreResult<Vec<Account>>;

    /// Balance of one account, optionally as of `cutoff` (inclusive).
    async fn account_balance(&self, account_id: &str, cutoff: Option<NaiveDate>)
    -> StoreResult<i64>;

    /// Category groups with their categories, hidden ones included.
    async fn category_groups(&self) -> StoreResult<Vec<CategoryGroup>>;

    /// Every payee, transfer payees included.
    async fn payees(&self) -> StoreResult<Vec<Payee>>;

    /// Transactions of one account dated within `since..=until`.
    async fn transactions(
        &self,
        account_id: &str,
        since: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<Transaction>>;

    /// Budget figures for one month.
    async fn budget_month(&self, month: &str) -> StoreResult<BudgetMonth>;

    /// Set the budgeted amount of one category in one month.
    async fn set_budget_amount(&self, month: &str, category_id: &str, amount: i64)
    -> StoreResult<()>;

    /// Book a new transaction on an account.
    async fn create_transaction(
        &self,
        account_id: &str,
        transaction: NewTransaction,
    ) -> StoreResult<()>;

    /// Apply a partial update to one transaction.
    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> StoreResult<()>;

    /// Delete one transaction.
    async fn delete_transaction(&self, transaction_id: &str) -> StoreResult<()>;

    /// Pull from the linked bank for one account, or for all linked accounts.
    async fn run_bank_sync(&self, account_id: Option<&str>) -> StoreResult<()>;
}
