//! Push executor: one full dependency-ordered cycle.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use serde::Serialize;

use tillpoint_cloud_sync::CloudSyncClient;
use tillpoint_core::errors::Result;
use tillpoint_core::sync::{PendingRecord, PUSH_ORDER};
use tillpoint_storage_sqlite::SyncRepository;

use crate::health;

/// Outcome of one completed push cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushCycleSummary {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    pub duration_ms: i64,
}

/// Walks the entity catalog in dependency order and pushes every eligible
/// row, reconciling each outcome into the local store immediately.
pub struct PushExecutor {
    repository: Arc<SyncRepository>,
    client: CloudSyncClient,
}

impl PushExecutor {
    pub fn new(repository: Arc<SyncRepository>, client: CloudSyncClient) -> Self {
        Self { repository, client }
    }

    /// Run one full cycle.
    ///
    /// Per kind the eligible set is fully drained before the next kind
    /// starts, so a dependency's push attempt always precedes its
    /// dependents'. Row pushes are awaited individually; a failed row is
    /// recorded and never aborts the rest of the cycle. Only local storage
    /// errors propagate; a cycle cannot fail because the network did.
    pub async fn run_cycle(&self) -> Result<PushCycleSummary> {
        let started_at = Instant::now();
        let mut attempted = 0usize;
        let mut synced = 0usize;
        let mut failed = 0usize;

        for kind in PUSH_ORDER {
            let pending = self.repository.list_pending(kind)?;
            if pending.is_empty() {
                continue;
            }
            debug!(
                "[CloudSync] Pushing {} {} record(s)",
                pending.len(),
                kind.wire_name()
            );
            for record in pending {
                attempted += 1;
                if self.push_record(&record).await? {
                    synced += 1;
                } else {
                    failed += 1;
                }
            }
        }

        if let Some(business_id) = self.repository.primary_business_id()? {
            health::report_cycle_completed(&self.client, &business_id).await;
        }

        let summary = PushCycleSummary {
            attempted,
            synced,
            failed,
            duration_ms: started_at.elapsed().as_millis() as i64,
        };
        debug!(
            "[CloudSync] Cycle complete attempted={} synced={} failed={} duration_ms={}",
            summary.attempted, summary.synced, summary.failed, summary.duration_ms
        );
        Ok(summary)
    }

    /// Push one record and reconcile the outcome. Returns whether it synced.
    async fn push_record(&self, record: &PendingRecord) -> Result<bool> {
        match self.client.upsert(&record.payload).await {
            Ok(ack) => {
                self.repository
                    .mark_synced(record.kind, &record.record_id, ack.remote_id.as_deref())?;
                Ok(true)
            }
            Err(err) => {
                let cause = format!("{} failure: {}", err.failure_kind().as_str(), err);
                warn!(
                    "[CloudSync] Push failed for {} {}: {}",
                    record.kind.wire_name(),
                    record.record_id,
                    cause
                );
                self.repository
                    .mark_failed(record.kind, &record.record_id, &cause)?;
                Ok(false)
            }
        }
    }
}
