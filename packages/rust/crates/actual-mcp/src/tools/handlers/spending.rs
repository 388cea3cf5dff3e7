use std::collections::HashMap;

use actual_store::Transaction;
use serde_json::json;

use super::transactions::scoped_accounts;
use super::{Fields, Names, fields};
use crate::session_gate::BudgetSession;
use crate::tools::error::ToolError;
use crate::tools::params::GetSpendingByCategoryParams;
use crate::tools::values::{format_date, parse_date, to_amount};

const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    spent: i64,
    count: usize,
}

/// Rows that carry spend: split parents give way to their lines, transfers and
/// inflows drop out.
fn spend_lines(txn: &Transaction) -> Vec<&Transaction> {
    if txn.transfer_id.is_some() {
        return Vec::new();
    }
    let lines: Vec<&Transaction> = if txn.is_parent || !txn.subtransactions.is_empty() {
        txn.subtransactions.iter().collect()
    } else {
        vec![txn]
    };
    lines
        .into_iter()
        .filter(|line| line.transfer_id.is_none() && line.amount < 0)
        .collect()
}

pub(super) async fn get_spending_by_category(
    session: &BudgetSession,
    params: GetSpendingByCategoryParams,
) -> Result<Fields, ToolError> {
    let start = parse_date(&params.start_date, "start_date")?;
    let end = parse_date(&params.end_date, "end_date")?;
    if start > end {
        return Err(ToolError::validation(format!(
            "start_date {} is after end_date {}",
            format_date(start),
            format_date(end)
        )));
    }
    let scope = params.account_id.as_deref();
    let account_ids = scoped_accounts(session, scope).await?;
    let names = Names::load(session).await?;

    let mut buckets: HashMap<Option<String>, Bucket> = HashMap::new();
    for account_id in &account_ids {
        for txn in session.transactions(account_id, start, Some(end)).await? {
            for line in spend_lines(&txn) {
                let bucket = buckets.entry(line.category_id.clone()).or_default();
                bucket.spent -= line.amount;
                bucket.count += 1;
            }
        }
    }

    let mut rows: Vec<(Option<String>, String, Bucket)> = buckets
        .into_iter()
        .map(|(category_id, bucket)| {
            let name = names
                .category_name(category_id.as_deref())
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            (category_id, name, bucket)
        })
        .collect();
    rows.sort_by(|a, b| b.2.spent.cmp(&a.2.spent).then_with(|| a.1.cmp(&b.1)));

    let total: i64 = rows.iter().map(|(_, _, bucket)| bucket.spent).sum();
    let categories: Vec<_> = rows
        .into_iter()
        .map(|(category_id, name, bucket)| {
            json!({
                "category_id": category_id,
                "category_name": name,
                "amount": to_amount(bucket.spent),
                "transaction_count": bucket.count,
            })
        })
        .collect();

    Ok(fields(json!({
        "start_date": format_date(start),
        "end_date": format_date(end),
        "total_spent": to_amount(total),
        "categories": categories,
    })))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn line(id: &str, amount: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_id: "a".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount,
            payee_id: None,
            category_id: None,
            notes: None,
            imported_payee: None,
            cleared: false,
            transfer_id: None,
            is_parent: false,
            subtransactions: Vec::new(),
        }
    }

    #[test]
    fn split_parent_is_replaced_by_its_lines() {
        let mut parent = line("p", -100);
        parent.is_parent = true;
        parent.subtransactions = vec![line("s1", -60), line("s2", -40)];
        let ids: Vec<_> = spend_lines(&parent).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2"]);
    }

    #[test]
    fn transfers_and_inflows_are_skipped() {
        let mut transfer = line("t", -500);
        transfer.transfer_id = Some("other".into());
        assert!(spend_lines(&transfer).is_empty());
        assert!(spend_lines(&line("in", 500)).is_empty());
        assert_eq!(spend_lines(&line("out", -5)).len(), 1);
    }
}
