//! Budget tools: catalog, argument types, dispatch and handlers.

mod catalog;
mod dispatch;
mod error;
mod handlers;
mod params;
mod values;

pub use catalog::{ToolDescriptor, ToolName, catalog};
pub use dispatch::{ToolDispatcher, ToolOutcome};
pub use error::ToolError;
pub use params::{
    CreateTransactionParams, DeleteTransactionParams, GetAccountBalanceParams, GetAccountsParams,
    GetBudgetMonthParams, GetCategoriesParams, GetCategoryBalanceParams, GetPayeesParams,
    GetSpendingByCategoryParams, GetTransactionsParams, RunBankSyncParams, SetBudgetAmountParams,
    UpdateTransactionParams,
};
