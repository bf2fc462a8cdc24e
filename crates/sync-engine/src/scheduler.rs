//! Cooperative sync scheduler.
//!
//! Cycles are driven by app lifecycle events, a repeating interval timer and
//! an explicit "sync now" trigger. The cycle mutex is the engine's only
//! concurrency primitive: a trigger that arrives while a cycle is running is
//! ignored, never queued. Backgrounding disarms the timer but lets an
//! in-flight cycle finish: row pushes are individually idempotent, so
//! completing them is always safe.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use tillpoint_core::sync::interval_jitter_ms;
use tillpoint_core::time::now_millis;

use crate::config::SyncConfig;
use crate::executor::{PushCycleSummary, PushExecutor};

/// Outcome of one trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleRun {
    /// A cycle ran to completion (possibly with per-row failures).
    Completed(PushCycleSummary),
    /// A cycle was already running; the trigger was ignored.
    Skipped,
    /// Sync is not configured; nothing to do.
    Disabled,
    /// The cycle aborted on a local storage error.
    Failed(String),
}

/// Mutable scheduler state with an explicit owner.
///
/// Held behind the scheduler object rather than module-level statics so a
/// fresh instance can be constructed per test or per application context.
struct SchedulerRuntime {
    cycle_mutex: Mutex<()>,
    timer_task: Mutex<Option<JoinHandle<()>>>,
}

pub struct SyncScheduler {
    config: SyncConfig,
    executor: Arc<PushExecutor>,
    runtime: Arc<SchedulerRuntime>,
}

impl SyncScheduler {
    pub fn new(config: SyncConfig, executor: Arc<PushExecutor>) -> Self {
        Self {
            config,
            executor,
            runtime: Arc::new(SchedulerRuntime {
                cycle_mutex: Mutex::new(()),
                timer_task: Mutex::new(None),
            }),
        }
    }

    /// App moved to the foreground (or cold-started): run a cycle if idle and
    /// arm the repeating timer.
    pub async fn handle_foreground(&self) -> CycleRun {
        if !self.config.is_configured() {
            debug!("[CloudSync] Sync not configured; foreground trigger ignored");
            return CycleRun::Disabled;
        }
        self.arm_timer().await;
        run_guarded(&self.runtime, &self.executor).await
    }

    /// App moved to the background: disarm the timer. An in-flight cycle is
    /// left to finish uninterrupted.
    pub async fn handle_background(&self) {
        let mut guard = self.runtime.timer_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            debug!("[CloudSync] Interval timer disarmed");
        }
    }

    /// Manual trigger; behaves exactly like a timer fire.
    pub async fn sync_now(&self) -> CycleRun {
        if !self.config.is_configured() {
            debug!("[CloudSync] Sync not configured; manual trigger ignored");
            return CycleRun::Disabled;
        }
        run_guarded(&self.runtime, &self.executor).await
    }

    /// Tear down scheduler state when the owning context unwinds.
    pub async fn shutdown(&self) {
        self.handle_background().await;
    }

    async fn arm_timer(&self) {
        let mut guard = self.runtime.timer_task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let interval = self.config.interval;
        let runtime = Arc::clone(&self.runtime);
        let executor = Arc::clone(&self.executor);
        let handle = tokio::spawn(async move {
            loop {
                let jitter = Duration::from_millis(interval_jitter_ms(now_millis()));
                tokio::time::sleep(interval + jitter).await;
                match run_guarded(&runtime, &executor).await {
                    CycleRun::Completed(summary) => {
                        debug!(
                            "[CloudSync] Timer cycle complete synced={} failed={}",
                            summary.synced, summary.failed
                        );
                    }
                    CycleRun::Skipped => {
                        debug!("[CloudSync] Timer fired while a cycle was running; ignored");
                    }
                    CycleRun::Failed(err) => {
                        warn!("[CloudSync] Timer cycle failed: {}", err);
                    }
                    CycleRun::Disabled => {}
                }
            }
        });
        *guard = Some(handle);
        info!(
            "[CloudSync] Interval timer armed ({}s cadence)",
            interval.as_secs()
        );
    }
}

/// Run one cycle if no cycle is in flight; otherwise report `Skipped`.
async fn run_guarded(runtime: &SchedulerRuntime, executor: &PushExecutor) -> CycleRun {
    let Ok(_guard) = runtime.cycle_mutex.try_lock() else {
        return CycleRun::Skipped;
    };
    match executor.run_cycle().await {
        Ok(summary) => CycleRun::Completed(summary),
        Err(err) => {
            warn!("[CloudSync] Cycle aborted on local error: {}", err);
            CycleRun::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tillpoint_core::entities::Customer;
    use tillpoint_core::sync::{SyncEntityKind, SyncStatus};

    use crate::test_support::{setup_repo, MockRemote};

    fn sample_customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            business_id: "t1".to_string(),
            full_name: "Amai Moyo".to_string(),
            phone: None,
            note: None,
        }
    }

    fn scheduler_for(remote: &MockRemote, repo: Arc<tillpoint_storage_sqlite::SyncRepository>) -> SyncScheduler {
        let executor = Arc::new(PushExecutor::new(repo, remote.client(None)));
        // Long cadence so the timer never fires during a test.
        let mut config = SyncConfig::for_api_url(remote.base_url.clone(), None);
        config.interval = Duration::from_secs(3600);
        SyncScheduler::new(config, executor)
    }

    #[tokio::test]
    async fn rapid_double_trigger_runs_exactly_one_cycle() {
        let remote = MockRemote::start().await;
        remote.set_response_delay(Duration::from_millis(300)).await;
        let repo = Arc::new(setup_repo());
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.save_customer(&sample_customer("c2")).unwrap();

        let scheduler = Arc::new(scheduler_for(&remote, Arc::clone(&repo)));

        let first = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.sync_now().await })
        };
        // Let the first trigger take the cycle mutex before the second fires.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = scheduler.sync_now().await;
        assert_eq!(second, CycleRun::Skipped);

        match first.await.unwrap() {
            CycleRun::Completed(summary) => {
                assert_eq!(summary.attempted, 2);
                assert_eq!(summary.synced, 2);
            }
            other => panic!("expected completed cycle, got {:?}", other),
        }

        // One cycle's worth of push calls, not two overlapping sets.
        assert_eq!(remote.recorded_upserts().await.len(), 2);

        remote.shutdown();
    }

    #[tokio::test]
    async fn foreground_runs_a_cycle_and_arms_the_timer() {
        let remote = MockRemote::start().await;
        let repo = Arc::new(setup_repo());
        repo.save_customer(&sample_customer("c1")).unwrap();

        let scheduler = scheduler_for(&remote, Arc::clone(&repo));
        match scheduler.handle_foreground().await {
            CycleRun::Completed(summary) => assert_eq!(summary.synced, 1),
            other => panic!("expected completed cycle, got {:?}", other),
        }
        let meta = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(meta.sync_status, SyncStatus::Synced);

        // Backgrounding disarms the timer; a second background call is a no-op.
        scheduler.handle_background().await;
        scheduler.handle_background().await;

        remote.shutdown();
    }

    #[tokio::test]
    async fn triggers_short_circuit_when_sync_is_not_configured() {
        let remote = MockRemote::start().await;
        let repo = Arc::new(setup_repo());
        repo.save_customer(&sample_customer("c1")).unwrap();

        let executor = Arc::new(PushExecutor::new(Arc::clone(&repo), remote.client(None)));
        let config = SyncConfig {
            api_url: None,
            shared_secret: None,
            interval: Duration::from_secs(3600),
        };
        let scheduler = SyncScheduler::new(config, executor);

        assert_eq!(scheduler.sync_now().await, CycleRun::Disabled);
        assert_eq!(scheduler.handle_foreground().await, CycleRun::Disabled);
        assert!(remote.recorded_upserts().await.is_empty());

        remote.shutdown();
    }
}
