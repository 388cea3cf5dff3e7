//! HTTP backend: an Actual HTTP API bridge (`/v1/budgets/{budget}/...`).
//!
//! Every response body is `{"data": ...}`; failures carry `{"error": "..."}`.
//! The credential travels as `x-api-key`, the optional budget encryption password
//! as `budget-encryption-password`.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::OpenConfig;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    Account, BudgetMonth, CategoryGroup, NewTransaction, Payee, Transaction, TransactionPatch,
};
use crate::store::BudgetStore;

const API_KEY_HEADER: &str = "x-api-key";
const ENCRYPTION_PASSWORD_HEADER: &str = "budget-encryption-password";
const VERSION_SEGMENTS: [&str; 2] = ["v1", "actualhttpapiversion"];

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

struct Connection {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    encryption_password: Option<String>,
}

#[derive(Default)]
struct SessionSlot {
    connection: Option<Arc<Connection>>,
    budget_id: Option<String>,
}

/// [`BudgetStore`] backed by the Actual HTTP API.
#[derive(Default)]
pub struct HttpBudgetStore {
    slot: RwLock<SessionSlot>,
}

impl HttpBudgetStore {
    /// Unopened store; call [`BudgetStore::open`] then [`BudgetStore::load_budget`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&self) -> StoreResult<Arc<Connection>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .connection
            .clone()
            .ok_or(StoreError::NotLoaded)
    }

    fn loaded(&self) -> StoreResult<(Arc<Connection>, String)> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match (&slot.connection, &slot.budget_id) {
            (Some(connection), Some(budget_id)) => Ok((Arc::clone(connection), budget_id.clone())),
            _ => Err(StoreError::NotLoaded),
        }
    }
}

impl Connection {
    fn request(&self, method: Method, segments: &[&str]) -> StoreResult<RequestBuilder> {
        let builder = self
            .client
            .request(method, endpoint(&self.base_url, segments)?)
            .header(API_KEY_HEADER, &self.api_key);
        Ok(match &self.encryption_password {
            Some(password) => builder.header(ENCRYPTION_PASSWORD_HEADER, password),
            None => builder,
        })
    }

    /// Request under `/v1/budgets/{budget_id}/`, one path segment per entry of `rest`.
    fn budget_request(
        &self,
        method: Method,
        budget_id: &str,
        rest: &[&str],
    ) -> StoreResult<RequestBuilder> {
        let mut segments = vec!["v1", "budgets", budget_id];
        segments.extend_from_slice(rest);
        self.request(method, &segments)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> StoreResult<T> {
        let response = check_status(builder.send().await?).await?;
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn execute(&self, builder: RequestBuilder) -> StoreResult<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// Appends `segments` to the base URL, each percent-encoded as exactly one path segment.
fn endpoint(base: &Url, segments: &[&str]) -> StoreResult<Url> {
    if let Some(segment) = segments
        .iter()
        .find(|segment| matches!(**segment, "" | "." | ".."))
    {
        return Err(StoreError::NotFound(format!(
            "no record with id '{segment}'"
        )));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| StoreError::Transport(format!("server url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::debug!(
        event = "actual.store.http.rejected",
        status = status.as_u16(),
        url = %response.url(),
        "budget server rejected request"
    );
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        _ => StoreError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(ToString::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

async fn prepare_data_dir(path: &Path) -> StoreResult<()> {
    let unusable = |reason: String| StoreError::DataDir {
        path: path.to_path_buf(),
        reason,
    };
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| unusable(e.to_string()))?;
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unusable(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(unusable("not a directory".to_string()));
    }
    Ok(())
}

#[async_trait]
impl BudgetStore for HttpBudgetStore {
    async fn open(&self, config: &OpenConfig) -> StoreResult<()> {
        prepare_data_dir(&config.data_dir).await?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("reqwest client: {e}")))?;
        let base_url = Url::parse(&config.server_url).map_err(|e| {
            StoreError::Transport(format!("invalid server url '{}': {e}", config.server_url))
        })?;
        let connection = Connection {
            client,
            base_url,
            api_key: config.password.clone(),
            encryption_password: config.encryption_password.clone(),
        };
        connection
            .execute(connection.request(Method::GET, &VERSION_SEGMENTS)?)
            .await?;

        tracing::debug!(
            event = "actual.store.http.opened",
            server_url = %connection.base_url,
            data_dir = %config.data_dir.display(),
            "budget server reachable"
        );
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = SessionSlot {
            connection: Some(Arc::new(connection)),
            budget_id: None,
        };
        Ok(())
    }

    async fn load_budget(&self, budget_id: &str) -> StoreResult<()> {
        let connection = self.connection()?;
        let months = connection.budget_request(Method::GET, budget_id, &["months"])?;
        match connection.execute(months).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {
                return Err(StoreError::NotFound(format!("budget '{budget_id}' not found")));
            }
            Err(other) => return Err(other),
        }
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .budget_id = Some(budget_id.to_string());
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = SessionSlot::default();
        Ok(())
    }

    async fn accounts(&self) -> StoreResult<Vec<Account>> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(Method::GET, &budget, &["accounts"])?;
        conn.fetch(builder).await
    }

    async fn account_balance(
        &self,
        account_id: &str,
        cutoff: Option<NaiveDate>,
    ) -> StoreResult<i64> {
        let (conn, budget) = self.loaded()?;
        let mut builder =
            conn.budget_request(Method::GET, &budget, &["accounts", account_id, "balance"])?;
        if let Some(cutoff) = cutoff {
            builder = builder.query(&[("cutoff_date", cutoff.to_string())]);
        }
        conn.fetch(builder).await
    }

    async fn category_groups(&self) -> StoreResult<Vec<CategoryGroup>> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(Method::GET, &budget, &["categorygroups"])?;
        conn.fetch(builder).await
    }

    async fn payees(&self) -> StoreResult<Vec<Payee>> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(Method::GET, &budget, &["payees"])?;
        conn.fetch(builder).await
    }

    async fn transactions(
        &self,
        account_id: &str,
        since: NaiveDate,
        until: Option<NaiveDate>,
    ) -> StoreResult<Vec<Transaction>> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(
            Method::GET,
            &budget,
            &["accounts", account_id, "transactions"],
        )?;
        let mut query = vec![("since_date", since.to_string())];
        if let Some(until) = until {
            query.push(("until_date", until.to_string()));
        }
        conn.fetch(builder.query(&query)).await
    }

    async fn budget_month(&self, month: &str) -> StoreResult<BudgetMonth> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(Method::GET, &budget, &["months", month])?;
        conn.fetch(builder).await
    }

    async fn set_budget_amount(
        &self,
        month: &str,
        category_id: &str,
        amount: i64,
    ) -> StoreResult<()> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(
            Method::PATCH,
            &budget,
            &["months", month, "categories", category_id],
        )?;
        let body = json!({ "category": { "budgeted": amount } });
        conn.execute(builder.json(&body)).await
    }

    async fn create_transaction(
        &self,
        account_id: &str,
        transaction: NewTransaction,
    ) -> StoreResult<()> {
        let (conn, budget) = self.loaded()?;
        let builder = conn.budget_request(
            Method::POST,
            &budget,
            &["accounts", account_id, "transactions"],
        )?;
        let body = json!({
            "transaction": transaction,
            "learnCategories": false,
            "runTransfers": false,
        });
        conn.execute(builder.json(&body)).await
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> StoreResult<()> {
        let (conn, budget) = self.loaded()?;
        let builder =
            conn.budget_request(Method::PATCH, &budget, &["transactions", transaction_id])?;
        let body = json!({ "transaction": patch });
        conn.execute(builder.json(&body)).await
    }

    async fn delete_transaction(&self, transaction_id: &str) -> StoreResult<()> {
        let (conn, budget) = self.loaded()?;
        let builder =
            conn.budget_request(Method::DELETE, &budget, &["transactions", transaction_id])?;
        conn.execute(builder).await
    }

    async fn run_bank_sync(&self, account_id: Option<&str>) -> StoreResult<()> {
        let (conn, budget) = self.loaded()?;
        let rest = match account_id {
            Some(account_id) => vec!["accounts", account_id, "banksync"],
            None => vec!["accounts", "banksync"],
        };
        conn.execute(conn.budget_request(Method::POST, &budget, &rest)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"error":"bad credential"}"#).as_deref(),
            Some("bad credential")
        );
        assert_eq!(
            error_message(r#"{"message":"nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(
            error_message("  plain text  ").as_deref(),
            Some("plain text")
        );
        assert!(error_message("").is_none());
        assert!(error_message(r#"{"status":"error"}"#).is_none());
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let base = Url::parse("http://budget.test/api/").unwrap();
        let url = endpoint(&base, &["v1", "transactions", "../a/b?c#d"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://budget.test/api/v1/transactions/..%2Fa%2Fb%3Fc%23d"
        );

        let bare = Url::parse("http://budget.test").unwrap();
        let url = endpoint(&bare, &["v1", "actualhttpapiversion"]).unwrap();
        assert_eq!(url.as_str(), "http://budget.test/v1/actualhttpapiversion");
    }

    #[test]
    fn endpoint_rejects_dot_and_empty_segments() {
        let base = Url::parse("http://budget.test").unwrap();
        for id in ["..", ".", ""] {
            let err = endpoint(&base, &["v1", "transactions", id]).unwrap_err();
            assert!(err.is_not_found(), "{id:?} gave {err:?}");
        }
    }

    #[tokio::test]
    async fn data_calls_before_load_are_rejected() {
        let store = HttpBudgetStore::new();
        let err = store.accounts().await.unwrap_err();
        assert!(matches!(err, StoreError::NotLoaded));
        let err = store.load_budget("budget-1").await.unwrap_err();
        assert!(matches!(err, StoreError::NotLoaded));
    }

    #[tokio::test]
    async fn data_dir_that_is_a_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let err = prepare_data_dir(file.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::DataDir { .. }), "got {err:?}");
    }
}
