//! Wire types shared with the cloud sync service.

use serde::{Deserialize, Serialize};

/// Successful upsert acknowledgment. The backend may return a handle to the
/// remote document, cached locally as `remote_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAck {
    pub remote_id: Option<String>,
}

/// Error body returned by the cloud service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

/// Body for the tenant health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportRequest {
    pub business_id: String,
}

/// Acknowledgment of a recorded health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAck {
    pub business_id: String,
    pub last_synced_at: String,
}
