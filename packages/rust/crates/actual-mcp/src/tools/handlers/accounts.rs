use serde_json::{Value, json};

use super::{Fields, fields, find_account};
use crate::session_gate::BudgetSession;
use crate::tools::error::ToolError;
use crate::tools::params::{GetAccountBalanceParams, GetAccountsParams, RunBankSyncParams};
use crate::tools::values::{format_date, parse_optional_date, to_amount};

pub(super) async fn get_accounts(
    session: &BudgetSession,
    params: GetAccountsParams,
) -> Result<Fields, ToolError> {
    let mut rows = Vec::new();
    for account in session.accounts().await? {
        if account.closed && !params.include_closed {
            continue;
        }
        let balance = session.account_balance(&account.id, None).await?;
        rows.push(json!({
            "id": account.id,
            "name": account.name,
            "off_budget": account.off_budget,
            "closed": account.closed,
            "balance": to_amount(balance),
        }));
    }
    Ok(fields(json!({ "count": rows.len(), "accounts": rows })))
}

pub(super) async fn get_account_balance(
    session: &BudgetSession,
    params: GetAccountBalanceParams,
) -> Result<Fields, ToolError> {
    let cutoff = parse_optional_date(params.cutoff_date.as_deref(), "cutoff_date")?;
    let account = find_account(session, &params.account_id).await?;
    let balance = session.account_balance(&account.id, cutoff).await?;
    Ok(fields(json!({
        "account_id": account.id,
        "account_name": account.name,
        "balance": to_amount(balance),
        "cutoff_date": cutoff.map(format_date),
    })))
}

pub(super) async fn run_bank_sync(
    session: &BudgetSession,
    params: RunBankSyncParams,
) -> Result<Fields, ToolError> {
    if let Some(account_id) = params.account_id.as_deref() {
        find_account(session, account_id).await?;
    }
    session.run_bank_sync(params.account_id.as_deref()).await?;
    tracing::info!(
        event = "actual.tool.bank_sync.completed",
        account_id = params.account_id.as_deref().unwrap_or("all"),
        "bank sync finished"
    );
    Ok(fields(json!({
        "account_id": params.account_id.map_or(Value::Null, Value::String),
    })))
}
