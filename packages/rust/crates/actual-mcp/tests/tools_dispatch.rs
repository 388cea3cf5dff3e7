//! Dispatcher: policy gate, envelopes, and the account/category/budget tools against the
//! sample budget.

use std::sync::Arc;

use actual_mcp::{GateStatus, SessionGate, SessionSetup, ToolDispatcher};
use actual_store::OpenConfig;
use actual_store::test_support::FakeBudgetStore;
use serde_json::{Value, json};

fn dispatcher(store: &Arc<FakeBudgetStore>, read_only: bool) -> ToolDispatcher {
    let setup = SessionSetup {
        open: OpenConfig::new("/tmp/actual-mcp-tests", "http://budget.test", "secret"),
        budget_id: "budget-1".to_string(),
        timeout: None,
    };
    ToolDispatcher::new(SessionGate::new(store.clone(), setup), read_only)
}

async fn call(dispatcher: &ToolDispatcher, name: &str, arguments: Value) -> Value {
    dispatcher.call(name, arguments).await.envelope()
}

fn sample() -> Arc<FakeBudgetStore> {
    Arc::new(FakeBudgetStore::with_sample_data())
}

#[tokio::test]
async fn read_only_refuses_mutations_before_touching_the_session() {
    let store = sample();
    let tools = dispatcher(&store, true);

    for (name, arguments) in [
        ("delete_transaction", json!({"transaction_id": "t-rent"})),
        (
            "set_budget_amount",
            json!({"month": "2024-03", "category_id": "cat-food", "amount": 1}),
        ),
        ("run_bank_sync", json!({})),
    ] {
        let envelope = call(&tools, name, arguments).await;
        assert_eq!(
            envelope,
            json!({
                "success": false,
                "error": format!("tool '{name}' is disabled in read-only mode"),
            })
        );
    }
    assert_eq!(store.open_calls(), 0);
    assert_eq!(tools.gate().state(), GateStatus::Uninitialized);
    assert_eq!(store.snapshot().transactions.len(), 10);
}

#[tokio::test]
async fn read_only_still_serves_reads() {
    let store = sample();
    let tools = dispatcher(&store, true);

    let envelope = call(&tools, "get_accounts", Value::Null).await;
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(store.open_calls(), 1);
}

#[tokio::test]
async fn unknown_tool_is_an_error_envelope() {
    let store = sample();
    let tools = dispatcher(&store, false);

    let envelope = call(&tools, "drop_budget", json!({})).await;
    assert_eq!(
        envelope,
        json!({"success": false, "error": "unknown tool 'drop_budget'"})
    );
    assert_eq!(store.open_calls(), 0);
}

#[tokio::test]
async fn setup_failure_reaches_every_call_with_the_original_message() {
    let store = Arc::new(
        FakeBudgetStore::with_sample_data()
            .failing_open("bad credential"),
    );
    let tools = dispatcher(&store, false);

    for name in ["get_accounts", "get_payees", "create_transaction"] {
        let envelope = call(&tools, name, json!({})).await;
        assert_eq!(
            envelope,
            json!({"success": false, "error": "bad credential"})
        );
    }
    assert_eq!(store.open_calls(), 1);
}

#[tokio::test]
async fn bad_arguments_are_validation_errors() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(&tools, "get_budget_month", json!({})).await;
    assert_eq!(envelope["success"], json!(false));
    let error = envelope["error"].as_str().unwrap();
    assert!(error.starts_with("invalid arguments:"), "{error}");

    let envelope = call(&tools, "get_budget_month", json!({"month": "March"})).await;
    assert_eq!(
        envelope["error"],
        json!("invalid arguments: month must be YYYY-MM, got 'March'")
    );
}

#[tokio::test]
async fn get_accounts_lists_open_accounts_with_balances() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(&tools, "get_accounts", json!({})).await;
    assert_eq!(
        envelope,
        json!({
            "success": true,
            "count": 2,
            "accounts": [
                {"id": "acct-checking", "name": "Checking", "off_budget": false, "closed": false, "balance": 1000.26},
                {"id": "acct-savings", "name": "Savings", "off_budget": false, "closed": false, "balance": 500.0},
            ],
        })
    );

    let envelope = call(&tools, "get_accounts", json!({"include_closed": true})).await;
    assert_eq!(envelope["count"], json!(3));
    assert_eq!(envelope["accounts"][2]["balance"], json!(-45.0));
}

#[tokio::test]
async fn get_account_balance_honours_cutoff_and_unknown_ids() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(
        &tools,
        "get_account_balance",
        json!({"account_id": "acct-checking", "cutoff_date": "2024-03-01"}),
    )
    .await;
    assert_eq!(
        envelope,
        json!({
            "success": true,
            "account_id": "acct-checking",
            "account_name": "Checking",
            "balance": 2970.0,
            "cutoff_date": "2024-03-01",
        })
    );

    let envelope = call(&tools, "get_account_balance", json!({"account_id": "nope"})).await;
    assert_eq!(
        envelope,
        json!({"success": false, "error": "account 'nope' not found"})
    );
}

#[tokio::test]
async fn get_categories_hides_hidden_unless_asked() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(&tools, "get_categories", json!({})).await;
    let everyday = &envelope["groups"][1];
    assert_eq!(everyday["name"], json!("Everyday"));
    assert_eq!(everyday["categories"].as_array().unwrap().len(), 2);

    let envelope = call(&tools, "get_categories", json!({"include_hidden": true})).await;
    let everyday = &envelope["groups"][1];
    assert_eq!(everyday["categories"].as_array().unwrap().len(), 3);
    assert_eq!(everyday["categories"][2]["hidden"], json!(true));
}

#[tokio::test]
async fn get_payees_sorts_and_searches() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(&tools, "get_payees", json!({})).await;
    let names: Vec<&str> = envelope["payees"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|payee| payee["name"].as_str())
        .collect();
    assert_eq!(
        names,
        [
            "Acme Corp",
            "City Power",
            "Green Grocer",
            "Landlord",
            "Transfer: Checking",
            "Transfer: Savings"
        ]
    );

    let envelope = call(&tools, "get_payees", json!({"search": "GROCER"})).await;
    assert_eq!(envelope["count"], json!(1));
    assert_eq!(envelope["payees"][0]["id"], json!("pay-grocer"));
}

#[tokio::test]
async fn budget_month_and_category_balance() {
    let tools = dispatcher(&sample(), false);

    let envelope = call(&tools, "get_budget_month", json!({"month": "2024-03"})).await;
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["to_budget"], json!(200.0));
    assert_eq!(envelope["groups"].as_array().unwrap().len(), 2);

    let envelope = call(
        &tools,
        "get_category_balance",
        json!({"month": "2024-03", "category_id": "cat-food"}),
    )
    .await;
    assert_eq!(
        envelope,
        json!({
            "success": true,
            "month": "2024-03",
            "category": {"id": "cat-food", "name": "Food", "budgeted": 250.0, "spent": -145.5, "balance": 104.5},
        })
    );

    let envelope = call(&tools, "get_budget_month", json!({"month": "2024-04"})).await;
    assert_eq!(
        envelope,
        json!({"success": false, "error": "month '2024-04' not found"})
    );

    let envelope = call(
        &tools,
        "get_category_balance",
        json!({"month": "2024-03", "category_id": "cat-nope"}),
    )
    .await;
    assert_eq!(
        envelope,
        json!({"success": false, "error": "category 'cat-nope' not found"})
    );
}

#[tokio::test]
async fn set_budget_amount_writes_cents() {
    let store = sample();
    let tools = dispatcher(&store, false);

    let envelope = call(
        &tools,
        "set_budget_amount",
        json!({"month": "2024-03", "category_id": "cat-food", "amount": 300.5}),
    )
    .await;
    assert_eq!(
        envelope,
        json!({
            "success": true,
            "month": "2024-03",
            "category_id": "cat-food",
            "category_name": "Food",
            "amount": 300.5,
        })
    );
    let march = store.snapshot().months["2024-03"].clone();
    assert_eq!(march.category("cat-food").unwrap().budgeted, 30_050);

    let envelope = call(
        &tools,
        "set_budget_amount",
        json!({"month": "2024-03", "category_id": "cat-nope", "amount": 1}),
    )
    .await;
    assert_eq!(envelope["error"], json!("category 'cat-nope' not found"));
}

#[tokio::test]
async fn run_bank_sync_for_one_or_all_accounts() {
    let store = sample();
    let tools = dispatcher(&store, false);

    assert_eq!(
        call(&tools, "run_bank_sync", json!({})).await,
        json!({"success": true, "account_id": null})
    );
    assert_eq!(
        call(
            &tools,
            "run_bank_sync",
            json!({"account_id": "acct-checking"}),
        )
        .await,
        json!({"success": true, "account_id": "acct-checking"})
    );
    assert_eq!(
        call(&tools, "run_bank_sync", json!({"account_id": "nope"})).await["error"],
        json!("account 'nope' not found")
    );
    assert_eq!(
        store.bank_syncs(),
        [None, Some("acct-checking".to_string())]
    );
}
