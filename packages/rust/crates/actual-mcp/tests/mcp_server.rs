//! End to end over an in-memory duplex: MCP client ↔ `ActualMcpServer`.

use std::sync::Arc;

use actual_mcp::{ActualMcpServer, SessionGate, SessionSetup, ToolDispatcher};
use actual_store::OpenConfig;
use actual_store::test_support::FakeBudgetStore;
use rmcp::ServiceExt;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ClientCapabilities, Implementation,
    InitializeRequestParams, ProtocolVersion,
};
use rmcp::service::{RoleClient, RunningService, serve_client};
use serde_json::{Value, json};

type Client = RunningService<RoleClient, InitializeRequestParams>;

async fn connect(store: &Arc<FakeBudgetStore>, read_only: bool) -> Client {
    let setup = SessionSetup {
        open: OpenConfig::new("/tmp/actual-mcp-tests", "http://budget.test", "secret"),
        budget_id: "budget-1".to_string(),
        timeout: None,
    };
    let server = ActualMcpServer::new(ToolDispatcher::new(
        SessionGate::new(store.clone(), setup),
        read_only,
    ));

    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        let running = server.serve(tokio::io::split(server_io)).await.unwrap();
        let _ = running.waiting().await;
    });

    let params = InitializeRequestParams {
        meta: None,
        protocol_version: ProtocolVersion::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation::from_build_env(),
    };
    serve_client(params, tokio::io::split(client_io))
        .await
        .unwrap()
}

async fn call(client: &Client, name: &str, arguments: Value) -> CallToolResult {
    client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: name.to_string().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        })
        .await
        .unwrap()
}

fn envelope(result: &CallToolResult) -> Value {
    let text = result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.clone())
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn lists_the_catalog_with_schemas() {
    let client = connect(&Arc::new(FakeBudgetStore::with_sample_data()), false).await;

    let tools = client.list_tools(None).await.unwrap().tools;
    assert_eq!(tools.len(), 13);
    let transactions = tools
        .iter()
        .find(|tool| tool.name == "get_transactions")
        .unwrap();
    assert_eq!(
        transactions.input_schema.get("type"),
        Some(&json!("object"))
    );
    assert!(
        transactions.input_schema["properties"]
            .get("start_date")
            .is_some()
    );

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn tool_calls_return_envelopes() {
    let store = Arc::new(FakeBudgetStore::with_sample_data());
    let client = connect(&store, false).await;

    let result = call(&client, "get_budget_month", json!({"month": "2024-03"})).await;
    assert_ne!(result.is_error, Some(true));
    let body = envelope(&result);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["month"], json!("2024-03"));

    let result = call(&client, "get_budget_month", json!({"month": "2024-04"})).await;
    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        envelope(&result),
        json!({"success": false, "error": "month '2024-04' not found"})
    );
    assert_eq!(store.open_calls(), 1);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn read_only_policy_applies_over_mcp() {
    let store = Arc::new(FakeBudgetStore::with_sample_data());
    let client = connect(&store, true).await;

    let result = call(
        &client,
        "delete_transaction",
        json!({"transaction_id": "t-rent"}),
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        envelope(&result)["error"],
        json!("tool 'delete_transaction' is disabled in read-only mode")
    );
    assert_eq!(store.open_calls(), 0);

    client.cancel().await.unwrap();
}
