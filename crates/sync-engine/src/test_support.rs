//! Shared test harness: a scriptable in-process cloud remote and a fresh
//! temp-database repository.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use tillpoint_cloud_sync::{CloudSyncClient, SHARED_SECRET_HEADER};
use tillpoint_storage_sqlite::{create_pool, init_database, run_migrations, SyncRepository};

pub fn setup_repo() -> SyncRepository {
    let app_data = tempdir()
        .expect("tempdir")
        .keep()
        .to_string_lossy()
        .to_string();
    let db_path = init_database(&app_data).expect("init db");
    run_migrations(&db_path).expect("migrate db");
    let pool = create_pool(&db_path).expect("create pool");
    SyncRepository::new(pool)
}

#[derive(Debug, Clone)]
pub struct RecordedUpsert {
    pub entity: String,
    pub record_id: String,
    pub body: Value,
}

#[derive(Default)]
struct MockRemoteState {
    upserts: Mutex<Vec<RecordedUpsert>>,
    health_reports: Mutex<Vec<String>>,
    fail_with: Mutex<HashMap<String, u16>>,
    fail_once: Mutex<HashMap<String, u16>>,
    required_secret: Mutex<Option<String>>,
    response_delay: Mutex<Option<Duration>>,
}

fn error_body(code: &str, message: &str) -> Value {
    json!({ "code": code, "message": message })
}

async fn check_secret(
    state: &MockRemoteState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<Value>)> {
    let required = state.required_secret.lock().await.clone();
    if let Some(required) = required {
        let presented = headers
            .get(SHARED_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(required.as_str()) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(error_body("UNAUTHORIZED", "shared secret mismatch")),
            ));
        }
    }
    Ok(())
}

async fn upsert_handler(
    State(state): State<Arc<MockRemoteState>>,
    Path(entity): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = check_secret(&state, &headers).await {
        return rejection;
    }

    let record_id = body["id"].as_str().unwrap_or_default().to_string();
    state.upserts.lock().await.push(RecordedUpsert {
        entity,
        record_id: record_id.clone(),
        body,
    });

    if let Some(status) = state.fail_once.lock().await.remove(&record_id) {
        return (
            StatusCode::from_u16(status).expect("valid status"),
            Json(error_body("SCRIPTED", "scripted one-shot failure")),
        );
    }
    if let Some(status) = state.fail_with.lock().await.get(&record_id).copied() {
        return (
            StatusCode::from_u16(status).expect("valid status"),
            Json(error_body("SCRIPTED", "scripted failure")),
        );
    }

    let delay = *state.response_delay.lock().await;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    (
        StatusCode::OK,
        Json(json!({ "remoteId": format!("srv-{}", record_id) })),
    )
}

async fn health_handler(
    State(state): State<Arc<MockRemoteState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = check_secret(&state, &headers).await {
        return rejection;
    }

    let business_id = body["businessId"].as_str().unwrap_or_default().to_string();
    state.health_reports.lock().await.push(business_id.clone());
    (
        StatusCode::OK,
        Json(json!({
            "businessId": business_id,
            "lastSyncedAt": "2026-08-07T10:00:00Z",
        })),
    )
}

/// In-process cloud remote with scriptable per-record failures.
pub struct MockRemote {
    pub base_url: String,
    state: Arc<MockRemoteState>,
    handle: JoinHandle<()>,
}

impl MockRemote {
    pub async fn start() -> Self {
        let state = Arc::new(MockRemoteState::default());
        let app = Router::new()
            .route("/api/v1/sync/health", post(health_handler))
            .route("/api/v1/sync/{entity}/upsert", post(upsert_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock remote");
        let addr = listener.local_addr().expect("mock remote addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn client(&self, shared_secret: Option<String>) -> CloudSyncClient {
        CloudSyncClient::new(&self.base_url, shared_secret)
    }

    pub async fn recorded_upserts(&self) -> Vec<RecordedUpsert> {
        self.state.upserts.lock().await.clone()
    }

    pub async fn health_reports(&self) -> Vec<String> {
        self.state.health_reports.lock().await.clone()
    }

    /// Every upsert for `record_id` fails with `status`.
    pub async fn fail_record(&self, record_id: &str, status: u16) {
        self.state
            .fail_with
            .lock()
            .await
            .insert(record_id.to_string(), status);
    }

    /// The next upsert for `record_id` fails with `status`; later ones succeed.
    pub async fn fail_record_once(&self, record_id: &str, status: u16) {
        self.state
            .fail_once
            .lock()
            .await
            .insert(record_id.to_string(), status);
    }

    pub async fn require_secret(&self, secret: &str) {
        *self.state.required_secret.lock().await = Some(secret.to_string());
    }

    pub async fn set_response_delay(&self, delay: Duration) {
        *self.state.response_delay.lock().await = Some(delay);
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}
