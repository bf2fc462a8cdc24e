//! Cloud sync API client.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use tillpoint_core::sync::UpsertPayload;

use crate::error::{CloudSyncError, Result};
use crate::types::{ApiErrorResponse, HealthAck, HealthReportRequest, UpsertAck};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Header carrying the operator-configured shared secret.
pub const SHARED_SECRET_HEADER: &str = "x-tillpoint-sync-secret";
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the Tillpoint cloud sync API.
///
/// Every upsert endpoint is safe to call repeatedly with identical arguments,
/// so callers retry freely after ambiguous transport failures.
#[derive(Debug, Clone)]
pub struct CloudSyncClient {
    client: reqwest::Client,
    base_url: String,
    shared_secret: Option<String>,
}

impl CloudSyncClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the cloud API (e.g., "https://sync.tillpoint.app")
    /// * `shared_secret` - Optional credential attached to every call
    pub fn new(base_url: &str, shared_secret: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            shared_secret,
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(secret) = self.shared_secret.as_deref() {
            let value = HeaderValue::from_str(secret).map_err(|_| {
                CloudSyncError::invalid_request("Shared secret contains invalid header characters")
            })?;
            headers.insert(SHARED_SECRET_HEADER, value);
        }

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[CloudSync] API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[CloudSync] API response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(CloudSyncError::api(
                    status.as_u16(),
                    format!("{}: {}", error.code, error.message),
                ));
            }
            return Err(CloudSyncError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[CloudSync] Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            CloudSyncError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Upsert one record by stable identity.
    ///
    /// POST /api/v1/sync/{entity}/upsert
    pub async fn upsert(&self, payload: &UpsertPayload) -> Result<UpsertAck> {
        let url = format!(
            "{}/api/v1/sync/{}/upsert",
            self.base_url,
            payload.kind().wire_name()
        );
        debug!(
            "[CloudSync] Upserting {} {}",
            payload.kind().wire_name(),
            payload.record_id()
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Record a tenant-scoped "last synced at" timestamp.
    ///
    /// POST /api/v1/sync/health
    pub async fn report_health(&self, business_id: &str) -> Result<HealthAck> {
        let url = format!("{}/api/v1/sync/health", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&HealthReportRequest {
                business_id: business_id.to_string(),
            })
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
