//! Database connection pool manager.
//!
//! Manages the SQLite connection pool with WAL mode enabled for better
//! concurrency, and applies the catalog schema on startup.

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

/// Idempotent catalog schema. The document payload is stored as JSON; the
/// `created_at` column is duplicated out of the payload so the full-collection
/// load can be ordered by the store.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS catalog_items (
        id TEXT PRIMARY KEY,
        payload TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_catalog_items_created_at
        ON catalog_items(created_at DESC)",
];

/// SQLite connection pool with pragmas tuned for concurrent access.
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Open a pool for `database_url` (e.g. "sqlite:.vitrine/catalog.db" or
    /// "sqlite::memory:") with WAL journaling, NORMAL synchronous mode, and a
    /// 5 second busy timeout.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("invalid database URL")?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // An in-memory database is per-connection; the pool must not fan out
        // or each connection would see its own empty database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Apply the catalog schema.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("failed to apply catalog schema")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
