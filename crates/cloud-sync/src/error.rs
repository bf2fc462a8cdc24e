//! Error types for the cloud sync client.

use thiserror::Error;

/// Result type alias for cloud sync operations.
pub type Result<T> = std::result::Result<T, CloudSyncError>;

/// Failure taxonomy as the push engine records it. Every kind is retried at
/// the scheduler cadence; the kind only changes what the diagnostic says and
/// what it takes for the retry to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushFailureKind {
    /// Credential mismatch. Retries fail identically until the operator
    /// fixes configuration.
    Authorization,
    /// Payload rejected by the backend schema. Only self-heals when the
    /// local row is edited again.
    Validation,
    /// Timeout or connectivity loss. Self-heals once the network returns.
    Transport,
}

impl PushFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushFailureKind::Authorization => "authorization",
            PushFailureKind::Validation => "validation",
            PushFailureKind::Transport => "transport",
        }
    }
}

/// Errors that can occur while talking to the cloud sync service.
#[derive(Debug, Error)]
pub enum CloudSyncError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the cloud service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (bad base URL, malformed secret, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CloudSyncError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify the failure for diagnostics and retry reporting.
    pub fn failure_kind(&self) -> PushFailureKind {
        match self {
            Self::Api { status, .. } => match *status {
                401 | 403 => PushFailureKind::Authorization,
                400 | 422 => PushFailureKind::Validation,
                _ => PushFailureKind::Transport,
            },
            Self::Http(_) => PushFailureKind::Transport,
            Self::Json(_) => PushFailureKind::Transport,
            Self::InvalidRequest(_) => PushFailureKind::Validation,
        }
    }
}
