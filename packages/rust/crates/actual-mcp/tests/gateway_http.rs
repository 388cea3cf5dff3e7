//! HTTP gateway router: `/health` reports the session gate state.

use std::sync::Arc;

use actual_mcp::{ActualMcpServer, SessionGate, SessionSetup, ToolDispatcher, router};
use actual_store::OpenConfig;
use actual_store::test_support::FakeBudgetStore;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn server(store: &Arc<FakeBudgetStore>, read_only: bool) -> ActualMcpServer {
    let setup = SessionSetup {
        open: OpenConfig::new("/tmp/actual-mcp-tests", "http://budget.test", "secret"),
        budget_id: "budget-1".to_string(),
        timeout: None,
    };
    ActualMcpServer::new(ToolDispatcher::new(
        SessionGate::new(store.clone(), setup),
        read_only,
    ))
}

async fn health(app: axum::Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_reports_an_untouched_session() {
    let store = Arc::new(FakeBudgetStore::with_sample_data());
    let cancellation = CancellationToken::new();
    let app = router(server(&store, true), &cancellation);

    let (status, body) = health(app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "read_only": true, "session": "uninitialized", "tools": 13})
    );
    assert_eq!(store.open_calls(), 0);
}

#[tokio::test]
async fn health_follows_the_gate() {
    let store = Arc::new(FakeBudgetStore::with_sample_data());
    let cancellation = CancellationToken::new();
    let server = server(&store, false);
    let gate = server.dispatcher().gate().clone();

    gate.ensure_ready().await.unwrap();
    let (_, body) = health(router(server.clone(), &cancellation)).await;
    assert_eq!(body["session"], json!("ready"));

    gate.shutdown().await.unwrap();
    let (_, body) = health(router(server, &cancellation)).await;
    assert_eq!(body["session"], json!("uninitialized"));
}

#[tokio::test]
async fn health_shows_a_failed_setup() {
    let store = Arc::new(
        FakeBudgetStore::with_sample_data()
            .failing_open("bad credential"),
    );
    let cancellation = CancellationToken::new();
    let server = server(&store, false);

    let outcome = server.dispatcher().call("get_accounts", json!({})).await;
    assert!(!outcome.is_success());

    let (_, body) = health(router(server, &cancellation)).await;
    assert_eq!(body["session"], json!("failed"));
}
