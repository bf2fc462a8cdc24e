//! Sync endpoints: one idempotent upsert route per entity type, plus tenant
//! health recording.
//!
//! Every route is gated by the shared secret when one is configured; a
//! rejected call has no partial effect. Payloads are typed per entity, so a
//! body that does not match the entity's field set is rejected before it
//! reaches the store.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, info};

use tillpoint_cloud_sync::{HealthAck, HealthReportRequest, UpsertAck};
use tillpoint_core::sync::{
    ActivityLogUpsert, BusinessUpsert, CashShiftUpsert, CustomerUpsert, ProductUpsert,
    SaleTransactionUpsert, StockReceiptUpsert, SubscriptionUpsert, UpsertPayload, UserUpsert,
};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatusResponse {
    business_id: String,
    last_synced_at: Option<String>,
}

async fn apply_upsert(
    state: &AppState,
    headers: &HeaderMap,
    payload: UpsertPayload,
) -> ApiResult<Json<UpsertAck>> {
    state.verify_secret(headers)?;
    debug!(
        "[Sync] Upserting {} {}",
        payload.kind().wire_name(),
        payload.record_id()
    );
    let document = state.store.upsert(&payload).await;
    Ok(Json(UpsertAck {
        remote_id: Some(document.remote_id),
    }))
}

async fn upsert_business(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BusinessUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::Business(body)).await
}

async fn upsert_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UserUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::User(body)).await
}

async fn upsert_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CustomerUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::Customer(body)).await
}

async fn upsert_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProductUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::Product(body)).await
}

async fn upsert_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SubscriptionUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::Subscription(body)).await
}

async fn upsert_sale_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SaleTransactionUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::SaleTransaction(body)).await
}

async fn upsert_cash_shift(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CashShiftUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::CashShift(body)).await
}

async fn upsert_stock_receipt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<StockReceiptUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::StockReceipt(body)).await
}

async fn upsert_activity_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ActivityLogUpsert>,
) -> ApiResult<Json<UpsertAck>> {
    apply_upsert(&state, &headers, UpsertPayload::ActivityLog(body)).await
}

async fn record_health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<HealthReportRequest>,
) -> ApiResult<Json<HealthAck>> {
    state.verify_secret(&headers)?;
    let last_synced_at = state.store.record_health(&body.business_id).await;
    info!("[Sync] Health recorded for {}", body.business_id);
    Ok(Json(HealthAck {
        business_id: body.business_id,
        last_synced_at,
    }))
}

async fn get_health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
) -> ApiResult<Json<HealthStatusResponse>> {
    state.verify_secret(&headers)?;
    let last_synced_at = state.store.health_for(&business_id).await;
    Ok(Json(HealthStatusResponse {
        business_id,
        last_synced_at,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Upserts, one per entity type
        .route("/api/v1/sync/business/upsert", post(upsert_business))
        .route("/api/v1/sync/user/upsert", post(upsert_user))
        .route("/api/v1/sync/customer/upsert", post(upsert_customer))
        .route("/api/v1/sync/product/upsert", post(upsert_product))
        .route("/api/v1/sync/subscription/upsert", post(upsert_subscription))
        .route(
            "/api/v1/sync/sale_transaction/upsert",
            post(upsert_sale_transaction),
        )
        .route("/api/v1/sync/cash_shift/upsert", post(upsert_cash_shift))
        .route(
            "/api/v1/sync/stock_receipt/upsert",
            post(upsert_stock_receipt),
        )
        .route(
            "/api/v1/sync/activity_log/upsert",
            post(upsert_activity_log),
        )
        // Tenant health
        .route("/api/v1/sync/health", post(record_health))
        .route("/api/v1/sync/health/{business_id}", get(get_health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_cloud_sync::CloudSyncClient;
    use tillpoint_core::sync::SyncEntityKind;

    async fn start_server(shared_secret: Option<&str>) -> (Arc<AppState>, String) {
        let state = Arc::new(AppState::new(shared_secret.map(|s| s.to_string())));
        let app = crate::api::router().with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (state, format!("http://{}", addr))
    }

    fn customer_payload(updated_at: i64) -> UpsertPayload {
        UpsertPayload::Customer(CustomerUpsert {
            id: "c1".to_string(),
            business_id: "t1".to_string(),
            updated_at,
            deleted: false,
            full_name: "Amai Moyo".to_string(),
            phone: None,
            note: None,
        })
    }

    #[tokio::test]
    async fn upsert_round_trip_returns_a_stable_handle() {
        let (state, base_url) = start_server(Some("till-secret")).await;
        let client = CloudSyncClient::new(&base_url, Some("till-secret".to_string()));

        let first = client.upsert(&customer_payload(1000)).await.expect("first");
        let second = client
            .upsert(&customer_payload(1000))
            .await
            .expect("second");
        assert_eq!(first.remote_id, second.remote_id);

        let stored = state
            .store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .expect("stored");
        assert_eq!(Some(stored.remote_id), first.remote_id);
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_with_no_partial_effect() {
        let (state, base_url) = start_server(Some("till-secret")).await;
        let wrong = CloudSyncClient::new(&base_url, Some("not-the-secret".to_string()));

        let err = wrong
            .upsert(&customer_payload(1000))
            .await
            .expect_err("rejected");
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("shared secret mismatch"));
        assert!(state
            .store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn missing_secret_is_rejected_when_one_is_required() {
        let (state, base_url) = start_server(Some("till-secret")).await;
        let anonymous = CloudSyncClient::new(&base_url, None);

        let err = anonymous
            .upsert(&customer_payload(1000))
            .await
            .expect_err("rejected");
        assert_eq!(err.status_code(), Some(401));
        assert!(state
            .store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn health_report_is_recorded_per_tenant() {
        let (state, base_url) = start_server(None).await;
        let client = CloudSyncClient::new(&base_url, None);

        let ack = client.report_health("t1").await.expect("health");
        assert_eq!(ack.business_id, "t1");
        assert_eq!(
            state.store.health_for("t1").await.as_deref(),
            Some(ack.last_synced_at.as_str())
        );
        assert!(state.store.health_for("t2").await.is_none());
    }
}
