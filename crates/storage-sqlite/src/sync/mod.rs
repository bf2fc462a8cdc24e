//! Sync-facing storage: change selection and status reconciliation.

mod repository;

pub use repository::*;
