//! HTTP client for the Tillpoint cloud sync service.
//!
//! One idempotent upsert endpoint per entity type plus the tenant health
//! endpoint. Every call optionally carries the operator-configured shared
//! secret; the backend rejects mismatches outright with no partial effect.

mod client;
mod error;
mod types;

pub use client::*;
pub use error::*;
pub use types::*;
