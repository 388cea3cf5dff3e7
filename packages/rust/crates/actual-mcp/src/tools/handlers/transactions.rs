use actual_store::{NewTransaction, Transaction, TransactionPatch};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{Value, json};

use super::{Fields, Names, fields, find_account, find_category};
use crate::session_gate::BudgetSession;
use crate::tools::error::ToolError;
use crate::tools::params::{
    CreateTransactionParams, DeleteTransactionParams, GetTransactionsParams,
    UpdateTransactionParams,
};
use crate::tools::values::{format_date, parse_date, parse_optional_date, to_amount, to_cents};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Checked query built from `get_transactions` arguments.
#[derive(Debug)]
struct TransactionQuery {
    start: NaiveDate,
    end: NaiveDate,
    category_id: Option<String>,
    payee_id: Option<String>,
    min_amount: Option<i64>,
    max_amount: Option<i64>,
    search: Option<String>,
    limit: usize,
}

impl TransactionQuery {
    fn from_params(params: &GetTransactionsParams, today: NaiveDate) -> Result<Self, ToolError> {
        let end = parse_optional_date(params.end_date.as_deref(), "end_date")?
            .unwrap_or(today);
        let start = parse_optional_date(params.start_date.as_deref(), "start_date")?
            .unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
        if start > end {
            return Err(ToolError::validation(format!(
                "start_date {} is after end_date {}",
                format_date(start),
                format_date(end)
            )));
        }

        let min_amount = params
            .min_amount
            .map(|amount| to_cents(amount, "min_amount"))
            .transpose()?;
        let max_amount = params
            .max_amount
            .map(|amount| to_cents(amount, "max_amount"))
            .transpose()?;
        if let (Some(min), Some(max)) = (min_amount, max_amount) {
            if min > max {
                return Err(ToolError::validation(
                    "min_amount is greater than max_amount",
                ));
            }
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ToolError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }

        Ok(Self {
            start,
            end,
            category_id: params.category_id.clone(),
            payee_id: params.payee_id.clone(),
            min_amount,
            max_amount,
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|needle| !needle.is_empty())
                .map(str::to_lowercase),
            limit,
        })
    }

    fn matches(&self, txn: &Transaction, names: &Names) -> bool {
        if let Some(category_id) = self.category_id.as_deref() {
            let in_category = txn.category_id.as_deref() == Some(category_id)
                || txn
                    .subtransactions
                    .iter()
                    .any(|sub| sub.category_id.as_deref() == Some(category_id));
            if !in_category {
                return false;
            }
        }
        if let Some(payee_id) = self.payee_id.as_deref() {
            if txn.payee_id.as_deref() != Some(payee_id) {
                return false;
            }
        }
        if self.min_amount.is_some_and(|min| txn.amount < min)
            || self.max_amount.is_some_and(|max| txn.amount > max)
        {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let haystacks = [
                names.payee_name(txn.payee_id.as_deref()),
                txn.imported_payee.as_deref(),
                txn.notes.as_deref(),
            ];
            if !haystacks
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(needle))
            {
                return false;
            }
        }
        true
    }
}

fn transaction_row(txn: &Transaction, names: &Names) -> Value {
    let subtransactions: Vec<_> = txn
        .subtransactions
        .iter()
        .map(|sub| {
            json!({
                "id": sub.id,
                "amount": to_amount(sub.amount),
                "category_id": sub.category_id,
                "category_name": names.category_name(sub.category_id.as_deref()),
                "notes": sub.notes,
            })
        })
        .collect();
    json!({
        "id": txn.id,
        "date": format_date(txn.date),
        "account_id": txn.account_id,
        "account_name": names.account_name(&txn.account_id),
        "amount": to_amount(txn.amount),
        "payee_id": txn.payee_id,
        "payee_name": names.payee_name(txn.payee_id.as_deref()),
        "imported_payee": txn.imported_payee,
        "category_id": txn.category_id,
        "category_name": names.category_name(txn.category_id.as_deref()),
        "notes": txn.notes,
        "cleared": txn.cleared,
        "is_transfer": txn.transfer_id.is_some(),
        "subtransactions": subtransactions,
    })
}

pub(super) async fn get_transactions(
    session: &BudgetSession,
    params: GetTransactionsParams,
) -> Result<Fields, ToolError> {
    let query = TransactionQuery::from_params(&params, Local::now().date_naive())?;
    let names = Names::load(session).await?;
    if let Some(category_id) = query.category_id.as_deref() {
        names.require_category(category_id)?;
    }

    let account_ids: Vec<String> = match params.account_id.as_deref() {
        Some(account_id) => vec![names.require_account(account_id)?.id.clone()],
        None => {
            let mut open: Vec<_> = names
                .accounts
                .values()
                .filter(|account| !account.closed)
                .map(|account| account.id.clone())
                .collect();
            open.sort();
            open
        }
    };

    let mut matched = Vec::new();
    for account_id in &account_ids {
        let rows = session
            .transactions(account_id, query.start, Some(query.end))
            .await?;
        matched.extend(rows.into_iter().filter(|txn| query.matches(txn, &names)));
    }
    matched.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    let total: i64 = matched.iter().map(|txn| txn.amount).sum();
    let truncated = matched.len() > query.limit;
    matched.truncate(query.limit);
    let rows: Vec<_> = matched
        .iter()
        .map(|txn| transaction_row(txn, &names))
        .collect();

    Ok(fields(json!({
        "start_date": format_date(query.start),
        "end_date": format_date(query.end),
        "count": rows.len(),
        "total_amount": to_amount(total),
        "truncated": truncated,
        "transactions": rows,
    })))
}

pub(super) async fn create_transaction(
    session: &BudgetSession,
    params: CreateTransactionParams,
) -> Result<Fields, ToolError> {
    let date = parse_date(&params.date, "date")?;
    let amount = to_cents(params.amount, "amount")?;
    let names = Names::load(session).await?;
    let account = names.require_account(&params.account_id)?;
    if let Some(category_id) = params.category_id.as_deref() {
        names.require_category(category_id)?;
    }
    if let Some(payee_id) = params.payee_id.as_deref() {
        if !names.payees.contains_key(payee_id) {
            return Err(ToolError::not_found("payee", payee_id));
        }
    }

    let transaction_id = uuid::Uuid::new_v4().to_string();
    let account_id = account.id.clone();
    session
        .create_transaction(
            &account_id,
            NewTransaction {
                id: transaction_id.clone(),
                date,
                amount,
                payee_id: params.payee_id,
                payee_name: params.payee_name,
                category_id: params.category_id,
                notes: params.notes,
                cleared: params.cleared,
            },
        )
        .await?;
    tracing::info!(
        event = "actual.tool.transaction.created",
        transaction_id = %transaction_id,
        account_id = %account_id,
        "transaction created"
    );
    Ok(fields(json!({
        "transaction_id": transaction_id,
        "account_id": account_id,
        "date": format_date(date),
        "amount": to_amount(amount),
    })))
}

pub(super) async fn update_transaction(
    session: &BudgetSession,
    params: UpdateTransactionParams,
) -> Result<Fields, ToolError> {
    let patch = TransactionPatch {
        date: parse_optional_date(params.date.as_deref(), "date")?,
        amount: params
            .amount
            .map(|amount| to_cents(amount, "amount"))
            .transpose()?,
        payee_id: params.payee_id,
        category_id: params.category_id,
        notes: params.notes,
        cleared: params.cleared,
    };
    if patch.is_empty() {
        return Err(ToolError::validation("no fields to update"));
    }
    if let Some(category_id) = patch.category_id.as_deref() {
        find_category(session, category_id).await?;
    }

    let updated_fields = patch.field_names();
    session
        .update_transaction(&params.transaction_id, patch)
        .await?;
    tracing::info!(
        event = "actual.tool.transaction.updated",
        transaction_id = %params.transaction_id,
        fields = ?updated_fields,
        "transaction updated"
    );
    Ok(fields(json!({
        "transaction_id": params.transaction_id,
        "updated_fields": updated_fields,
    })))
}

pub(super) async fn delete_transaction(
    session: &BudgetSession,
    params: DeleteTransactionParams,
) -> Result<Fields, ToolError> {
    session.delete_transaction(&params.transaction_id).await?;
    tracing::info!(
        event = "actual.tool.transaction.deleted",
        transaction_id = %params.transaction_id,
        "transaction deleted"
    );
    Ok(fields(json!({ "transaction_id": params.transaction_id })))
}

/// Used by `get_spending_by_category` to scope accounts the same way.
pub(super) async fn scoped_accounts(
    session: &BudgetSession,
    account_id: Option<&str>,
) -> Result<Vec<String>, ToolError> {
    match account_id {
        Some(account_id) => Ok(vec![find_account(session, account_id).await?.id]),
        None => Ok(session
            .accounts()
            .await?
            .into_iter()
            .filter(|account| !account.off_budget)
            .map(|account| account.id)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    #[test]
    fn window_defaults_to_thirty_days_ending_today() {
        let query = TransactionQuery::from_params(&GetTransactionsParams::default(), today())
            .unwrap();
        assert_eq!(query.end, today());
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let params = GetTransactionsParams {
            start_date: Some("2024-03-10".into()),
            end_date: Some("2024-03-01".into()),
            ..GetTransactionsParams::default()
        };
        let err = TransactionQuery::from_params(&params, today()).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn limit_bounds() {
        for limit in [0, MAX_LIMIT + 1] {
            let params = GetTransactionsParams {
                limit: Some(limit),
                ..GetTransactionsParams::default()
            };
            assert!(TransactionQuery::from_params(&params, today()).is_err());
        }
    }
}
