//! Operator activity trail.

use serde::{Deserialize, Serialize};

/// An audit entry for a staff action. The `user_id` reference is logical
/// only; it is not enforced remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub business_id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub occurred_at: i64,
}
