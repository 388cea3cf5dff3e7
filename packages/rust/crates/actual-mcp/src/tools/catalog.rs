//! The fixed set of tools this server exposes.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

use super::params::{
    CreateTransactionParams, DeleteTransactionParams, GetAccountBalanceParams, GetAccountsParams,
    GetBudgetMonthParams, GetCategoriesParams, GetCategoryBalanceParams, GetPayeesParams,
    GetSpendingByCategoryParams, GetTransactionsParams, RunBankSyncParams, SetBudgetAmountParams,
    UpdateTransactionParams,
};

/// Every tool the dispatcher knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetAccounts,
    GetAccountBalance,
    GetCategories,
    GetPayees,
    GetTransactions,
    GetBudgetMonth,
    GetCategoryBalance,
    GetSpendingByCategory,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    SetBudgetAmount,
    RunBankSync,
}

impl ToolName {
    pub const ALL: [Self; 13] = [
        Self::GetAccounts,
        Self::GetAccountBalance,
        Self::GetCategories,
        Self::GetPayees,
        Self::GetTransactions,
        Self::GetBudgetMonth,
        Self::GetCategoryBalance,
        Self::GetSpendingByCategory,
        Self::CreateTransaction,
        Self::UpdateTransaction,
        Self::DeleteTransaction,
        Self::SetBudgetAmount,
        Self::RunBankSync,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetAccounts => "get_accounts",
            Self::GetAccountBalance => "get_account_balance",
            Self::GetCategories => "get_categories",
            Self::GetPayees => "get_payees",
            Self::GetTransactions => "get_transactions",
            Self::GetBudgetMonth => "get_budget_month",
            Self::GetCategoryBalance => "get_category_balance",
            Self::GetSpendingByCategory => "get_spending_by_category",
            Self::CreateTransaction => "create_transaction",
            Self::UpdateTransaction => "update_transaction",
            Self::DeleteTransaction => "delete_transaction",
            Self::SetBudgetAmount => "set_budget_amount",
            Self::RunBankSync => "run_bank_sync",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Tools that write to the budget. Read-only mode refuses these.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreateTransaction
                | Self::UpdateTransaction
                | Self::DeleteTransaction
                | Self::SetBudgetAmount
                | Self::RunBankSync
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GetAccounts => "List budget accounts with their current balances.",
            Self::GetAccountBalance => {
                "Get the balance of one account, optionally as of a cutoff date."
            }
            Self::GetCategories => "List category groups and their categories.",
            Self::GetPayees => "List payees, optionally filtered by name.",
            Self::GetTransactions => {
                "Search transactions by date range, account, category, payee, amount or text. \
                 Newest first."
            }
            Self::GetBudgetMonth => {
                "Get the budget for a month: amount to budget, totals, and per-category \
                 budgeted, spent and balance."
            }
            Self::GetCategoryBalance => {
                "Get budgeted, spent and balance for one category in a month."
            }
            Self::GetSpendingByCategory => {
                "Total outflows per category over a date range, largest first."
            }
            Self::CreateTransaction => "Create a transaction on an account.",
            Self::UpdateTransaction => "Change fields of an existing transaction.",
            Self::DeleteTransaction => "Delete a transaction.",
            Self::SetBudgetAmount => "Set the budgeted amount for a category in a month.",
            Self::RunBankSync => "Pull new transactions from linked bank accounts.",
        }
    }

    /// JSON Schema of the tool arguments.
    pub fn input_schema(self) -> Map<String, Value> {
        match self {
            Self::GetAccounts => schema_of::<GetAccountsParams>(),
            Self::GetAccountBalance => schema_of::<GetAccountBalanceParams>(),
            Self::GetCategories => schema_of::<GetCategoriesParams>(),
            Self::GetPayees => schema_of::<GetPayeesParams>(),
            Self::GetTransactions => schema_of::<GetTransactionsParams>(),
            Self::GetBudgetMonth => schema_of::<GetBudgetMonthParams>(),
            Self::GetCategoryBalance => schema_of::<GetCategoryBalanceParams>(),
            Self::GetSpendingByCategory => schema_of::<GetSpendingByCategoryParams>(),
            Self::CreateTransaction => schema_of::<CreateTransactionParams>(),
            Self::UpdateTransaction => schema_of::<UpdateTransactionParams>(),
            Self::DeleteTransaction => schema_of::<DeleteTransactionParams>(),
            Self::SetBudgetAmount => schema_of::<SetBudgetAmountParams>(),
            Self::RunBankSync => schema_of::<RunBankSyncParams>(),
        }
    }
}

fn schema_of<T: JsonSchema>() -> Map<String, Value> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(schema)) => schema,
        _ => {
            let mut fallback = Map::new();
            fallback.insert("type".to_string(), Value::String("object".to_string()));
            fallback
        }
    }
}

/// Serializable catalog entry (`actual-mcp tools`, `tools/list`).
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub mutation: bool,
    pub input_schema: Map<String, Value>,
}

impl From<ToolName> for ToolDescriptor {
    fn from(tool: ToolName) -> Self {
        Self {
            name: tool.as_str(),
            description: tool.description(),
            mutation: tool.is_mutation(),
            input_schema: tool.input_schema(),
        }
    }
}

#[must_use]
pub fn catalog() -> Vec<ToolDescriptor> {
    ToolName::ALL
        .into_iter()
        .map(ToolDescriptor::from)
        .collect()
}
