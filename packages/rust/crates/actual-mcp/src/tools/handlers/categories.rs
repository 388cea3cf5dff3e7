use serde_json::json;

use super::{Fields, fields};
use crate::session_gate::BudgetSession;
use crate::tools::error::ToolError;
use crate::tools::params::{GetCategoriesParams, GetPayeesParams};

pub(super) async fn get_categories(
    session: &BudgetSession,
    params: GetCategoriesParams,
) -> Result<Fields, ToolError> {
    let groups: Vec<_> = session
        .category_groups()
        .await?
        .into_iter()
        .filter(|group| params.include_hidden || !group.hidden)
        .map(|group| {
            let categories: Vec<_> = group
                .categories
                .into_iter()
                .filter(|category| params.include_hidden || !category.hidden)
                .map(|category| {
                    json!({
                        "id": category.id,
                        "name": category.name,
                        "is_income": category.is_income,
                        "hidden": category.hidden,
                    })
                })
                .collect();
            json!({
                "id": group.id,
                "name": group.name,
                "is_income": group.is_income,
                "hidden": group.hidden,
                "categories": categories,
            })
        })
        .collect();
    Ok(fields(json!({ "groups": groups })))
}

pub(super) async fn get_payees(
    session: &BudgetSession,
    params: GetPayeesParams,
) -> Result<Fields, ToolError> {
    let needle = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);
    let mut payees = session.payees().await?;
    if let Some(needle) = needle {
        payees.retain(|payee| payee.name.to_lowercase().contains(&needle));
    }
    payees.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let rows: Vec<_> = payees
        .into_iter()
        .map(|payee| {
            json!({
                "id": payee.id,
                "name": payee.name,
                "transfer_account_id": payee.transfer_account_id,
            })
        })
        .collect();
    Ok(fields(json!({ "count": rows.len(), "payees": rows })))
}
