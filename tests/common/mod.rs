//! Purpose: Loopback fake of a few Increase endpoints for integration tests.
//! Exports: `FakeApi`, `account_json`.
//! Role: Real HTTP on 127.0.0.1 so the `ureq` transport, retries and cursors run end to end.
//! Invariants: Each `FakeApi` owns its runtime and state; tests never share a server.
//! Invariants: Only `Bearer test_key` is accepted; anything else gets a 401 envelope.
#![allow(dead_code)]

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

pub const API_KEY: &str = "test_key";

#[derive(Clone, Default)]
struct FakeState {
    requests: Arc<Mutex<Vec<String>>>,
    account_hits: Arc<AtomicUsize>,
}

impl FakeState {
    fn record(&self, method: &Method, uri: &Uri) {
        self.requests
            .lock()
            .expect("lock")
            .push(format!("{method} {uri}"));
    }
}

pub struct FakeApi {
    pub base_url: String,
    state: FakeState,
    _runtime: Runtime,
}

impl FakeApi {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        let state = FakeState::default();
        let app = router(state.clone());
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        runtime.spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
            _runtime: runtime,
        }
    }

    /// `"METHOD /path?query"` for every request served, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().expect("lock").clone()
    }
}

fn router(state: FakeState) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id", get(flaky_account))
        .route("/account_numbers/:id", get(missing_object))
        .route("/transactions", get(malformed_transactions))
        .route(
            "/simulations/account_transfers/:id/complete",
            post(complete_transfer),
        )
        .with_state(state)
}

pub fn account_json(id: &str) -> String {
    format!(
        r#"{{"bank":"first_internet_bank","closed_at":null,"created_at":"2020-01-31T23:59:59Z","currency":"USD","entity_id":null,"id":"{id}","idempotency_key":null,"informational_entity_id":null,"interest_accrued":"0.00","interest_accrued_at":null,"interest_rate":"0.055","name":"Account {id}","program_id":"program_i2v2os4mwza1oetokh9i","status":"open","type":"account"}}"#
    )
}

fn json(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn unauthorized(headers: &HeaderMap) -> Option<Response> {
    let expected = format!("Bearer {API_KEY}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());
    if authorized {
        return None;
    }
    Some(json(
        StatusCode::UNAUTHORIZED,
        r#"{"status":401,"type":"invalid_api_key_error","title":"Invalid API key.","detail":null}"#
            .to_string(),
    ))
}

async fn list_accounts(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(&method, &uri);
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let (ids, next_cursor) = match query.get("cursor").map(String::as_str) {
        None => (vec!["account_1", "account_2", "account_3"], "\"cur_abc\""),
        Some("cur_abc") => (vec!["account_4", "account_5"], "null"),
        Some(_) => {
            return json(
                StatusCode::BAD_REQUEST,
                r#"{"status":400,"type":"invalid_parameters_error","title":"Bad cursor."}"#
                    .to_string(),
            );
        }
    };
    let data = ids
        .iter()
        .map(|id| account_json(id))
        .collect::<Vec<_>>()
        .join(",");
    json(
        StatusCode::OK,
        format!(r#"{{"data":[{data}],"next_cursor":{next_cursor}}}"#),
    )
}

/// Fails with a retryable 503 on the first hit, then serves the account.
async fn flaky_account(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    state.record(&method, &uri);
    if state.account_hits.fetch_add(1, Ordering::SeqCst) == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::RETRY_AFTER, "0"),
            ],
            r#"{"status":503,"type":"internal_server_error","title":"Try again."}"#,
        )
            .into_response();
    }
    json(StatusCode::OK, account_json(&id))
}

async fn missing_object(State(state): State<FakeState>, method: Method, uri: Uri) -> Response {
    state.record(&method, &uri);
    json(
        StatusCode::NOT_FOUND,
        r#"{"status":404,"type":"object_not_found_error","title":"Could not find the object.","detail":"No account number with that id."}"#
            .to_string(),
    )
}

async fn malformed_transactions(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
) -> Response {
    state.record(&method, &uri);
    json(
        StatusCode::OK,
        r#"{"data":[{"id":"transaction_1","amount":"ten"}],"next_cursor":null}"#.to_string(),
    )
}

async fn complete_transfer(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    state.record(&method, &uri);
    json(
        StatusCode::OK,
        format!(
            r#"{{"account_id":"account_1","amount":100,"approval":null,"cancellation":null,"created_at":"2020-01-31T23:59:59Z","currency":"USD","description":"Savings","destination_account_id":"account_2","destination_transaction_id":"transaction_2","id":"{id}","idempotency_key":null,"network":"account","pending_transaction_id":null,"status":"complete","transaction_id":"transaction_1","type":"account_transfer"}}"#
        ),
    )
}
