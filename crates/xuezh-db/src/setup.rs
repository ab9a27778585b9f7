//! Database setup and initialization.
//!
//! Schema changes are applied as numbered migrations. Each applied version
//! is recorded in `schema_migrations`, so opening an up-to-date database is
//! a no-op.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Ordered schema migrations: `(version, statements)`.
const MIGRATIONS: &[(&str, &[&str])] = &[(
    "0001_pronunciation_attempts",
    &[
        r#"
        CREATE TABLE IF NOT EXISTS pronunciation_attempts (
            id TEXT PRIMARY KEY,
            item_id TEXT,
            ts TEXT NOT NULL,
            backend_id TEXT NOT NULL,
            artifacts_json TEXT NOT NULL,
            summary_json TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_attempts_item ON pronunciation_attempts(item_id, ts)",
    ],
)];

/// Sets up the `SQLite` database connection and brings the schema up to date.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The database file cannot be opened or created
/// - A migration fails
///
/// # Example
///
/// ```rust,no_run
/// use xuezh_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/path/to/db.sqlite3")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await
    .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Opens an existing database without creating or migrating it.
///
/// Used by diagnostics, which must not leave a fresh file behind.
pub async fn open_existing_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(false)
            .read_only(true),
    )
    .await
    .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with the full production schema.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Number of applied schema migrations.
pub async fn schema_migration_count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("n")?)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for &(version, statements) in MIGRATIONS {
        let applied = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await?
            .is_some();
        if applied {
            debug!(version, "Migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        for statement in statements {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }
        sqlx::query(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?, datetime('now'))",
        )
        .bind(version)
        .execute(&mut *tx)
        .await?;
        tx.commit()
            .await
            .with_context(|| format!("Failed to apply migration {version}"))?;
        info!(version, "Applied schema migration");
    }
    Ok(())
}
