//! Engine configuration from environment variables.

use std::time::Duration;

use tillpoint_core::sync::SYNC_INTERVAL_SECS;

pub const ENV_API_URL: &str = "TILLPOINT_SYNC_API_URL";
pub const ENV_SHARED_SECRET: &str = "TILLPOINT_SYNC_SHARED_SECRET";
pub const ENV_INTERVAL_SECS: &str = "TILLPOINT_SYNC_INTERVAL_SECS";

/// Sync engine configuration.
///
/// An absent or empty API URL disables background sync entirely: the
/// scheduler short-circuits every trigger instead of attempting pushes that
/// cannot reach a backend.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_url: Option<String>,
    pub shared_secret: Option<String>,
    pub interval: Duration,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let interval_secs = std::env::var(ENV_INTERVAL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(SYNC_INTERVAL_SECS);

        Self {
            api_url: non_empty_env(ENV_API_URL),
            shared_secret: std::env::var(ENV_SHARED_SECRET)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Configuration pointing at a known backend, used by tests and embedders.
    pub fn for_api_url(api_url: impl Into<String>, shared_secret: Option<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            shared_secret,
            interval: Duration::from_secs(SYNC_INTERVAL_SECS),
        }
    }

    /// Whether background sync is enabled at all.
    pub fn is_configured(&self) -> bool {
        self.api_url.as_deref().is_some_and(|v| !v.is_empty())
    }
}
