//! Shared server state.

use axum::http::HeaderMap;

use tillpoint_cloud_sync::SHARED_SECRET_HEADER;

use crate::error::{ApiError, ApiResult};
use crate::store::DocumentStore;

pub struct AppState {
    pub store: DocumentStore,
    /// Operator-configured shared secret; when set, every call must match.
    pub shared_secret: Option<String>,
}

impl AppState {
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("TILLPOINT_SYNC_SHARED_SECRET")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        )
    }

    pub fn new(shared_secret: Option<String>) -> Self {
        Self {
            store: DocumentStore::new(),
            shared_secret,
        }
    }

    /// Gate every sync call: when a secret is configured the caller's
    /// credential must match exactly, otherwise the call is rejected before
    /// any store access.
    pub fn verify_secret(&self, headers: &HeaderMap) -> ApiResult<()> {
        let Some(required) = self.shared_secret.as_deref() else {
            return Ok(());
        };
        let presented = headers
            .get(SHARED_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented == Some(required) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("shared secret mismatch".to_string()))
        }
    }
}
