//! Argument types for each tool. Field docs become the JSON Schema descriptions
//! agents see in `tools/list`.

use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ToolError;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetAccountsParams {
    /// Include closed accounts (default false).
    #[serde(default)]
    pub include_closed: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAccountBalanceParams {
    /// Account id.
    pub account_id: String,
    /// Only count transactions on or before this date (YYYY-MM-DD).
    #[serde(default)]
    pub cutoff_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetCategoriesParams {
    /// Include hidden groups and categories (default false).
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetPayeesParams {
    /// Case-insensitive substring of the payee name.
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetTransactionsParams {
    /// Restrict to one account. Without it every open account is scanned.
    #[serde(default)]
    pub account_id: Option<String>,
    /// First day, inclusive (YYYY-MM-DD). Defaults to 30 days before `end_date`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD). Defaults to today.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Only transactions in this category (split lines included).
    #[serde(default)]
    pub category_id: Option<String>,
    /// Only transactions with this payee.
    #[serde(default)]
    pub payee_id: Option<String>,
    /// Inclusive lower bound, in currency units. Outflows are negative.
    #[serde(default)]
    pub min_amount: Option<f64>,
    /// Inclusive upper bound, in currency units.
    #[serde(default)]
    pub max_amount: Option<f64>,
    /// Case-insensitive match on payee name, imported payee or notes.
    #[serde(default)]
    pub search: Option<String>,
    /// Maximum rows returned (default 100, at most 1000).
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetBudgetMonthParams {
    /// Budget month (YYYY-MM).
    pub month: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCategoryBalanceParams {
    /// Budget month (YYYY-MM).
    pub month: String,
    /// Category id.
    pub category_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSpendingByCategoryParams {
    /// First day, inclusive (YYYY-MM-DD).
    pub start_date: String,
    /// Last day, inclusive (YYYY-MM-DD).
    pub end_date: String,
    /// Restrict to one account. Without it every on-budget account counts.
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTransactionParams {
    /// Account the transaction is booked on.
    pub account_id: String,
    /// Transaction date (YYYY-MM-DD).
    pub date: String,
    /// Amount in currency units; negative for outflows.
    pub amount: f64,
    /// Existing payee id.
    #[serde(default)]
    pub payee_id: Option<String>,
    /// Payee name, used when no `payee_id` is given.
    #[serde(default)]
    pub payee_name: Option<String>,
    /// Category id.
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Mark as cleared (default false).
    #[serde(default)]
    pub cleared: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTransactionParams {
    /// Transaction id.
    pub transaction_id: String,
    /// New date (YYYY-MM-DD).
    #[serde(default)]
    pub date: Option<String>,
    /// New amount in currency units.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub payee_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cleared: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTransactionParams {
    /// Transaction id.
    pub transaction_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetBudgetAmountParams {
    /// Budget month (YYYY-MM).
    pub month: String,
    /// Category id.
    pub category_id: String,
    /// Budgeted amount in currency units.
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RunBankSyncParams {
    /// Sync one account. Without it every linked account syncs.
    #[serde(default)]
    pub account_id: Option<String>,
}

/// Decodes tool arguments. Absent arguments decode as an empty object.
pub(crate) fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|error| ToolError::validation(error.to_string()))
}
