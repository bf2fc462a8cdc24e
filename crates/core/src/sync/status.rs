//! Per-record sync status state machine.

use serde::{Deserialize, Serialize};

use crate::errors::{DatabaseError, Error, Result};

/// Local push state of a syncable record.
///
/// Lifecycle: a record is created `Pending`; it becomes `Synced` only after a
/// remote acknowledgment for that exact row; any later local edit (including a
/// soft delete) resets it to `Pending`. `Failed` is not terminal; failed rows
/// are re-selected on every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
}

impl SyncStatus {
    /// Column value stored in SQLite.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        }
    }

    /// Parse a stored column value.
    pub fn from_db_str(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(Error::Database(DatabaseError::Internal(format!(
                "Unknown sync status '{}'",
                other
            )))),
        }
    }

    /// Whether a row in this state is eligible for the next push cycle.
    pub fn is_push_eligible(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::Failed)
    }
}

/// Sync metadata carried by every independently-tracked record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMeta {
    pub sync_status: SyncStatus,
    pub remote_id: Option<String>,
    pub deleted: bool,
    pub last_error: Option<String>,
    pub updated_at: i64,
}
