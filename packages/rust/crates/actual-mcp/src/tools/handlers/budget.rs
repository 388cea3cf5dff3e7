use actual_store::BudgetMonthCategory;
use serde_json::{Value, json};

use super::{Fields, fields, find_category};
use crate::session_gate::BudgetSession;
use crate::tools::error::ToolError;
use crate::tools::params::{GetBudgetMonthParams, GetCategoryBalanceParams, SetBudgetAmountParams};
use crate::tools::values::{parse_month, to_amount, to_cents};

fn category_row(category: &BudgetMonthCategory) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "budgeted": to_amount(category.budgeted),
        "spent": to_amount(category.spent),
        "balance": to_amount(category.balance),
    })
}

pub(super) async fn get_budget_month(
    session: &BudgetSession,
    params: GetBudgetMonthParams,
) -> Result<Fields, ToolError> {
    let month = parse_month(&params.month)?;
    let budget = session.budget_month(&month).await?;
    let groups: Vec<_> = budget
        .category_groups
        .iter()
        .map(|group| {
            json!({
                "id": group.id,
                "name": group.name,
                "is_income": group.is_income,
                "hidden": group.hidden,
                "categories": group.categories.iter().map(category_row).collect::<Vec<_>>(),
            })
        })
        .collect();
    Ok(fields(json!({
        "month": budget.month,
        "to_budget": to_amount(budget.to_budget),
        "total_budgeted": to_amount(budget.total_budgeted),
        "total_spent": to_amount(budget.total_spent),
        "total_balance": to_amount(budget.total_balance),
        "groups": groups,
    })))
}

pub(super) async fn get_category_balance(
    session: &BudgetSession,
    params: GetCategoryBalanceParams,
) -> Result<Fields, ToolError> {
    let month = parse_month(&params.month)?;
    let budget = session.budget_month(&month).await?;
    let category = budget
        .category(&params.category_id)
        .ok_or_else(|| ToolError::not_found("category", &params.category_id))?;
    Ok(fields(json!({
        "month": month,
        "category": category_row(category),
    })))
}

pub(super) async fn set_budget_amount(
    session: &BudgetSession,
    params: SetBudgetAmountParams,
) -> Result<Fields, ToolError> {
    let month = parse_month(&params.month)?;
    let amount = to_cents(params.amount, "amount")?;
    let category = find_category(session, &params.category_id).await?;
    session
        .set_budget_amount(&month, &category.id, amount)
        .await?;
    tracing::info!(
        event = "actual.tool.budget.updated",
        month = %month,
        category_id = %category.id,
        amount_cents = amount,
        "budget amount set"
    );
    Ok(fields(json!({
        "month": month,
        "category_id": category.id,
        "category_name": category.name,
        "amount": to_amount(amount),
    })))
}
