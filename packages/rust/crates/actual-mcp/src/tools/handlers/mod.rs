//! Tool bodies. Each takes a ready session plus decoded arguments and returns the
//! result fields that go next to `"success": true`.

mod accounts;
mod budget;
mod categories;
mod spending;
mod transactions;

use std::collections::HashMap;

use actual_store::{Account, Category};
use serde_json::{Map, Value};

use super::catalog::ToolName;
use super::error::ToolError;
use super::params::decode;
use crate::session_gate::BudgetSession;

pub(crate) type Fields = Map<String, Value>;

pub(crate) async fn invoke(
    tool: ToolName,
    session: &BudgetSession,
    arguments: Value,
) -> Result<Fields, ToolError> {
    match tool {
        ToolName::GetAccounts => accounts::get_accounts(session, decode(arguments)?).await,
        ToolName::GetAccountBalance => {
            accounts::get_account_balance(session, decode(arguments)?).await
        }
        ToolName::GetCategories => categories::get_categories(session, decode(arguments)?).await,
        ToolName::GetPayees => categories::get_payees(session, decode(arguments)?).await,
        ToolName::GetTransactions => {
            transactions::get_transactions(session, decode(arguments)?).await
        }
        ToolName::GetBudgetMonth => budget::get_budget_month(session, decode(arguments)?).await,
        ToolName::GetCategoryBalance => {
            budget::get_category_balance(session, decode(arguments)?).await
        }
        ToolName::GetSpendingByCategory => {
            spending::get_spending_by_category(session, decode(arguments)?).await
        }
        ToolName::CreateTransaction => {
            transactions::create_transaction(session, decode(arguments)?).await
        }
        ToolName::UpdateTransaction => {
            transactions::update_transaction(session, decode(arguments)?).await
        }
        ToolName::DeleteTransaction => {
            transactions::delete_transaction(session, decode(arguments)?).await
        }
        ToolName::SetBudgetAmount => budget::set_budget_amount(session, decode(arguments)?).await,
        ToolName::RunBankSync => accounts::run_bank_sync(session, decode(arguments)?).await,
    }
}

/// Turns a `json!({...})` object into result fields.
pub(crate) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) async fn find_account(
    session: &BudgetSession,
    account_id: &str,
) -> Result<Account, ToolError> {
    session
        .accounts()
        .await?
        .into_iter()
        .find(|account| account.id == account_id)
        .ok_or_else(|| ToolError::not_found("account", account_id))
}

pub(crate) async fn find_category(
    session: &BudgetSession,
    category_id: &str,
) -> Result<Category, ToolError> {
    session
        .category_groups()
        .await?
        .into_iter()
        .flat_map(|group| group.categories)
        .find(|category| category.id == category_id)
        .ok_or_else(|| ToolError::not_found("category", category_id))
}

/// Id-to-name tables for resolving transaction rows.
#[derive(Debug, Default)]
pub(crate) struct Names {
    pub accounts: HashMap<String, Account>,
    pub payees: HashMap<String, String>,
    pub categories: HashMap<String, Category>,
}

impl Names {
    pub(crate) async fn load(session: &BudgetSession) -> Result<Self, ToolError> {
        let accounts = session
            .accounts()
            .await?
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();
        let payees = session
            .payees()
            .await?
            .into_iter()
            .map(|payee| (payee.id, payee.name))
            .collect();
        let categories = session
            .category_groups()
            .await?
            .into_iter()
            .flat_map(|group| group.categories)
            .map(|category| (category.id.clone(), category))
            .collect();
        Ok(Self {
            accounts,
            payees,
            categories,
        })
    }

    pub(crate) fn account_name(&self, id: &str) -> Option<&str> {
        self.accounts.get(id).map(|account| account.name.as_str())
    }

    pub(crate) fn payee_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.payees.get(id)).map(String::as_str)
    }

    pub(crate) fn category_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.categories.get(id))
            .map(|category| category.name.as_str())
    }

    pub(crate) fn require_account(&self, id: &str) -> Result<&Account, ToolError> {
        self.accounts
            .get(id)
            .ok_or_else(|| ToolError::not_found("account", id))
    }

    pub(crate) fn require_category(&self, id: &str) -> Result<&Category, ToolError> {
        self.categories
            .get(id)
            .ok_or_else(|| ToolError::not_found("category", id))
    }
}
