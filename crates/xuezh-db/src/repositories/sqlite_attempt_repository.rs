//! `SQLite` implementation of the `AttemptRepository` trait.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use xuezh_core::{AttemptRecord, AttemptRepository, RepositoryError};

/// `SQLite` implementation of the `AttemptRepository` trait.
///
/// Artifacts and the summary are stored as JSON text columns.
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    /// Create a new repository over an already migrated pool.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(e: sqlx::Error, id: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return RepositoryError::AlreadyExists(format!("attempt {id}"));
    }
    RepositoryError::Storage(e.to_string())
}

fn row_to_attempt(row: &SqliteRow) -> Result<AttemptRecord, RepositoryError> {
    let artifacts_json: String = row
        .try_get("artifacts_json")
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;
    let summary_json: String = row
        .try_get("summary_json")
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

    Ok(AttemptRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        item_id: row
            .try_get("item_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        ts: row
            .try_get("ts")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        backend_id: row
            .try_get("backend_id")
            .map_err(|e| RepositoryError::Storage(e.to_string()))?,
        artifacts: serde_json::from_str(&artifacts_json)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
        summary: serde_json::from_str(&summary_json)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
    })
}

#[async_trait]
impl AttemptRepository for SqliteAttemptRepository {
    async fn insert(&self, record: &AttemptRecord) -> Result<(), RepositoryError> {
        let artifacts_json = serde_json::to_string(&record.artifacts)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let summary_json = serde_json::to_string(&record.summary)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO pronunciation_attempts \
             (id, item_id, ts, backend_id, artifacts_json, summary_json) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.item_id)
        .bind(&record.ts)
        .bind(&record.backend_id)
        .bind(&artifacts_json)
        .bind(&summary_json)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &record.id))?;

        debug!(id = %record.id, backend = %record.backend_id, "Stored pronunciation attempt");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<AttemptRecord, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, item_id, ts, backend_id, artifacts_json, summary_json \
             FROM pronunciation_attempts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?
        .ok_or_else(|| RepositoryError::NotFound(format!("attempt {id}")))?;

        row_to_attempt(&row)
    }
}
