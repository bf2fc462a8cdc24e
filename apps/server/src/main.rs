//! Tillpoint cloud sync service.
//!
//! Reference implementation of the multi-tenant upsert backend the device
//! engine pushes into: one idempotent upsert route per entity type, an
//! optional shared-secret gate, and tenant health recording.

use std::sync::Arc;

use tracing::info;

mod api;
mod error;
mod state;
mod store;

use state::AppState;

fn bind_addr() -> String {
    std::env::var("TILLPOINT_SERVER_BIND")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "127.0.0.1:8787".to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tillpoint_server=info,info".into()),
        )
        .init();

    let state = Arc::new(AppState::from_env());
    if state.shared_secret.is_some() {
        info!("[Sync] Shared-secret gate enabled");
    } else {
        info!("[Sync] No shared secret configured; accepting all callers");
    }

    let addr = bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", addr, e));
    info!("[Sync] Listening on {}", addr);

    let app = api::router().with_state(state);
    if let Err(e) = axum::serve(listener, app).await {
        panic!("Server error: {}", e);
    }
}
