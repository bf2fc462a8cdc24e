//! Tenant health reporting.
//!
//! After a cycle completes, whether or not every row succeeded, the engine
//! records a tenant-scoped "last synced at" timestamp on the remote side for
//! operator dashboards. This is informational only: a failed report is
//! logged and never gates retries or cycle outcomes.

use log::{debug, warn};
use tillpoint_cloud_sync::CloudSyncClient;

pub async fn report_cycle_completed(client: &CloudSyncClient, business_id: &str) {
    match client.report_health(business_id).await {
        Ok(ack) => {
            debug!(
                "[CloudSync] Health recorded for {} at {}",
                ack.business_id, ack.last_synced_at
            );
        }
        Err(err) => {
            warn!(
                "[CloudSync] Health report for {} failed (ignored): {}",
                business_id, err
            );
        }
    }
}
