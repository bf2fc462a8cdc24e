//! SQLite local record store for Tillpoint.
//!
//! The device's authoritative working copy lives here: one table per entity
//! type, each row carrying sync metadata. The sync engine reads eligible rows
//! through [`sync::SyncRepository`] and writes push outcomes back; the rest of
//! the application writes domain fields through the same repository's save
//! helpers, which bump `updated_at` and reset rows to pending.

pub mod db;
pub mod errors;
pub mod models;
pub mod schema;
pub mod sync;

pub use db::{create_pool, get_connection, init_database, run_migrations, DbPool};
pub use errors::StorageError;
pub use sync::SyncRepository;
