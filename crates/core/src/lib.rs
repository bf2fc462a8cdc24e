//! Core domain model and sync contracts for Tillpoint.
//!
//! This crate is storage- and transport-agnostic: it defines the entity
//! catalog, the per-record sync-status state machine, and the typed wire
//! payloads the push engine sends to the cloud upsert service.

pub mod entities;
pub mod errors;
pub mod sync;
pub mod time;

pub use errors::{DatabaseError, Error, Result};
