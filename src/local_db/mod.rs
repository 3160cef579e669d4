//! # Local Database Module
//!
//! Durable local persistence for todo records, backed by SQLite. Every user
//! mutation lands here first, regardless of network state; the sync engine
//! later reconciles this store against the remote one.
//!
//! ## Architecture
//!
//! The local database holds three tables:
//! - **todos**: the record set itself, keyed by a locally-assigned integer
//! - **remote_tombstones**: deletes of synced records awaiting remote acknowledgment
//! - **sync_metadata**: key/value synchronization state (last sync time)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use syncpad::local_db::LocalStore;
//!
//! # async fn example() -> syncpad::error::Result<()> {
//! let store = LocalStore::open("/tmp/syncpad/local.db").await?;
//!
//! let local_id = store.create("Buy milk").await?;
//! let todos = store.list_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod todos;

use crate::error::{Result, SyncError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Local database connection manager
///
/// Manages the SQLite connection pool and provides the todo record
/// operations the presentation layer and the sync engine build on.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open or create the local database at the given path
    ///
    /// Creates the file and parent directory if missing and initializes the
    /// schema. Uses WAL mode for better concurrency.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::storage(format!("create {}: {}", parent.display(), e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Build a store over an existing pool and initialize the schema
    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        // schema.sql holds multiple statements; execute them one at a time
        for statement in include_str!("schema.sql").split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Basic store statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await?;

        let pending_push: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM todos WHERE remote_id IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let pending_delete: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM remote_tombstones")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            total: total.0 as u64,
            pending_push: pending_push.0 as u64,
            pending_delete: pending_delete.0 as u64,
        })
    }
}

/// Local store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of todo records
    pub total: u64,
    /// Records that have never been pushed (no remote identifier yet)
    pub pending_push: u64,
    /// Tombstones awaiting a remote delete
    pub pending_delete: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("local.db")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_creates_database() {
        let (_dir, store) = temp_store().await;
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending_push, 0);
        assert_eq!(stats.pending_delete, 0);
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.db");

        let first = LocalStore::open(&path).await.unwrap();
        first.create("persists").await.unwrap();
        drop(first);

        // Re-opening the same file must keep the schema and the data
        let second = LocalStore::open(&path).await.unwrap();
        assert_eq!(second.stats().await.unwrap().total, 1);
    }
}
