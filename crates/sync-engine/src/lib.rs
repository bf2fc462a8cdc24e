//! Device-to-cloud push synchronization engine.
//!
//! One cycle walks the entity catalog in dependency order, pushes every
//! eligible row through its idempotent upsert endpoint, reconciles each
//! outcome back into the local store, and reports tenant health. The
//! scheduler guarantees at most one cycle runs at a time; everything else is
//! per-row and failure-isolated.

pub mod config;
pub mod executor;
pub mod health;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use config::SyncConfig;
pub use executor::{PushCycleSummary, PushExecutor};
pub use scheduler::{CycleRun, SyncScheduler};
