//! Domain types as the budget server reports them.
//!
//! Field names follow the server's wire format (`offbudget`, `transfer_acct`,
//! `categoryGroups`, ...); the Rust names are the readable ones. Amounts are cents.

#![allow(missing_docs)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "offbudget", default)]
    pub off_budget: bool,
    #[serde(default)]
    pub closed: bool,
}

/// A category group and its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A spending or income category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub hidden: bool,
}

/// A payee. Transfer payees point at the account on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
    #[serde(rename = "transfer_acct", default)]
    pub transfer_account_id: Option<String>,
}

/// A posted transaction. Split parents carry their children in `subtransactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "account")]
    pub account_id: String,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(rename = "payee", default)]
    pub payee_id: Option<String>,
    #[serde(rename = "category", default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub imported_payee: Option<String>,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub transfer_id: Option<String>,
    #[serde(default)]
    pub is_parent: bool,
    #[serde(default)]
    pub subtransactions: Vec<Transaction>,
}

/// Budget figures for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMonth {
    pub month: String,
    #[serde(default)]
    pub to_budget: i64,
    #[serde(default)]
    pub total_budgeted: i64,
    #[serde(default)]
    pub total_spent: i64,
    #[serde(default)]
    pub total_balance: i64,
    #[serde(default)]
    pub category_groups: Vec<BudgetMonthGroup>,
}

/// One category group inside a [`BudgetMonth`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetMonthGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub categories: Vec<BudgetMonthCategory>,
}

/// Budgeted, spent, and remaining balance for one category in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetMonthCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub budgeted: i64,
    #[serde(default)]
    pub spent: i64,
    #[serde(default)]
    pub balance: i64,
}

impl BudgetMonth {
    /// Find a category across all groups.
    #[must_use]
    pub fn category(&self, category_id: &str) -> Option<&BudgetMonthCategory> {
        self.category_groups
            .iter()
            .flat_map(|group| group.categories.iter())
            .find(|category| category.id == category_id)
    }
}

/// Payload for creating a transaction. The caller chooses the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(rename = "payee", default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_name: Option<String>,
    #[serde(rename = "category", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub cleared: bool,
}

/// Partial update for a transaction; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(rename = "payee", default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<String>,
    #[serde(rename = "category", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
}

impl TransactionPatch {
    /// Names of the fields this patch sets, in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.date.is_some() {
            names.push("date");
        }
        if self.amount.is_some() {
            names.push("amount");
        }
        if self.payee_id.is_some() {
            names.push("payee_id");
        }
        if self.category_id.is_some() {
            names.push("category_id");
        }
        if self.notes.is_some() {
            names.push("notes");
        }
        if self.cleared.is_some() {
            names.push("cleared");
        }
        names
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_decodes_server_field_names() {
        let raw = r#"{
            "id": "t1",
            "account": "acct-1",
            "date": "2024-03-05",
            "amount": -1250,
            "payee": "p1",
            "category": null,
            "notes": "coffee",
            "cleared": true
        }"#;
        let txn: Transaction = serde_json::from_str(raw).expect("decode");
        assert_eq!(txn.account_id, "acct-1");
        assert_eq!(txn.payee_id.as_deref(), Some("p1"));
        assert!(txn.category_id.is_none());
        assert!(txn.subtransactions.is_empty());
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).expect("date"));
    }

    #[test]
    fn budget_month_uses_camel_case_totals() {
        let raw = r#"{
            "month": "2024-03",
            "toBudget": 5000,
            "totalBudgeted": -120000,
            "totalSpent": -80000,
            "totalBalance": 40000,
            "categoryGroups": [
                {"id": "g1", "name": "Bills", "categories": [
                    {"id": "c1", "name": "Rent", "budgeted": 100000, "spent": -100000, "balance": 0}
                ]}
            ]
        }"#;
        let month: BudgetMonth = serde_json::from_str(raw).expect("decode");
        assert_eq!(month.to_budget, 5000);
        assert_eq!(month.category("c1").map(|c| c.name.as_str()), Some("Rent"));
        assert!(month.category("missing").is_none());
    }

    #[test]
    fn patch_lists_only_set_fields() {
        let patch = TransactionPatch {
            amount: Some(-500),
            notes: Some("lunch".to_string()),
            ..TransactionPatch::default()
        };
        assert_eq!(patch.field_names(), vec!["amount", "notes"]);
        assert!(TransactionPatch::default().is_empty());

        let body = serde_json::to_value(&patch).expect("encode");
        assert_eq!(body, serde_json::json!({"amount": -500, "notes": "lunch"}));
    }
}
