//! Attempt repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::AttemptRecord;

/// Persistence for pronunciation attempts.
///
/// Records are append-only: inserted once at the end of a successful run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Store a new attempt.
    ///
    /// Returns `Err(RepositoryError::AlreadyExists)` if the id is taken.
    async fn insert(&self, record: &AttemptRecord) -> Result<(), RepositoryError>;

    /// Fetch an attempt by id.
    async fn get(&self, id: &str) -> Result<AttemptRecord, RepositoryError>;
}
