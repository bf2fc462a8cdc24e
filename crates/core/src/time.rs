//! Timestamp helpers.
//!
//! Local mutation timestamps are epoch milliseconds; RFC3339 strings are only
//! used for operator-facing fields.

use chrono::Utc;

/// Current wall clock as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current wall clock as an RFC3339 string.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
