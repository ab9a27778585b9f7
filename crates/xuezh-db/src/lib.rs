//! `SQLite` persistence for xuezh.
//!
//! Owns the connection pool, the versioned schema and the repository
//! implementations of the core ports. Nothing outside this crate sees `sqlx`.

#![deny(unsafe_code)]

pub mod repositories;
pub mod setup;

pub use repositories::SqliteAttemptRepository;

pub use setup::{open_existing_database, schema_migration_count, setup_database};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
