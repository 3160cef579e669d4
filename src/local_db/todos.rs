//! # Local Todo Record Operations
//!
//! CRUD operations for todo records in the local SQLite database, plus the
//! tombstone queue for deletes of already-synced records and the sync
//! metadata accessors.
//!
//! ## Features
//!
//! - **Record Storage**: create, patch, delete and list todo records
//! - **Identity Promotion**: atomically rewrite a record once the remote
//!   store assigns its permanent identifier
//! - **Tombstones**: remember deletes that still need a remote counterpart removed
//! - **Sync Metadata**: last-sync bookkeeping
//!
//! ## Usage
//!
//! ```rust,no_run
//! use syncpad::local_db::LocalStore;
//! use syncpad::types::TodoPatch;
//!
//! # async fn example(store: LocalStore) -> syncpad::error::Result<()> {
//! let id = store.create("Buy milk").await?;
//! store.update(id, &TodoPatch::done(true)).await?;
//! store.delete(id).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SyncError};
use crate::local_db::LocalStore;
use crate::types::{TodoPatch, TodoRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// A pending remote delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    /// Remote identifier of the deleted record
    pub remote_id: String,
    /// When the local delete happened, RFC 3339
    pub deleted_at: String,
}

impl LocalStore {
    /// Create a new todo record
    ///
    /// Assigns a fresh local identifier and stores the record with
    /// `done = false` and no remote identifier. Returns the local id.
    pub async fn create(&self, text: impl AsRef<str>) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO todos (text, done, created_at, updated_at) VALUES (?, 0, ?, ?)",
        )
        .bind(text.as_ref())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a record that already carries its remote identity
    ///
    /// Used when adopting documents found remotely but absent locally, for
    /// example after signing in on a fresh device. Returns the local id.
    pub async fn insert_synced(
        &self,
        remote_id: &str,
        text: &str,
        done: bool,
        owner_id: &str,
    ) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO todos (remote_id, text, done, owner_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(remote_id)
        .bind(text)
        .bind(done)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a single record by local id
    pub async fn get(&self, local_id: i64) -> Result<Option<TodoRecord>> {
        let row = sqlx::query(
            "SELECT local_id, remote_id, text, done, owner_id, created_at, updated_at
             FROM todos WHERE local_id = ?",
        )
        .bind(local_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_todo(&row)?)),
            None => Ok(None),
        }
    }

    /// Merge a patch into an existing record
    ///
    /// Fails with `NotFound` if the local id does not exist.
    pub async fn update(&self, local_id: i64, patch: &TodoPatch) -> Result<()> {
        let existing = self
            .get(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found(format!("todo {}", local_id)))?;

        let text = patch.text.clone().unwrap_or(existing.text);
        let done = patch.done.unwrap_or(existing.done);

        sqlx::query("UPDATE todos SET text = ?, done = ?, updated_at = ? WHERE local_id = ?")
            .bind(&text)
            .bind(done)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(local_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a record
    ///
    /// Idempotent: a missing id is a no-op, not an error, so a retried sync
    /// or a double delete from the UI cannot fail. If the record was already
    /// synced, a tombstone is written in the same transaction so the remote
    /// copy is removed on the next reconciliation pass.
    pub async fn delete(&self, local_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT remote_id FROM todos WHERE local_id = ?")
            .bind(local_id)
            .fetch_optional(&mut *tx)
            .await?;

        let remote_id: Option<String> = match row {
            Some(row) => row.try_get("remote_id")?,
            None => return Ok(()),
        };

        if let Some(remote_id) = remote_id {
            sqlx::query(
                "INSERT OR REPLACE INTO remote_tombstones (remote_id, deleted_at) VALUES (?, ?)",
            )
            .bind(&remote_id)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM todos WHERE local_id = ?")
            .bind(local_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// List every record in storage order
    pub async fn list_all(&self) -> Result<Vec<TodoRecord>> {
        let rows = sqlx::query(
            "SELECT local_id, remote_id, text, done, owner_id, created_at, updated_at
             FROM todos ORDER BY local_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row_to_todo(&row)?);
        }
        Ok(records)
    }

    /// Atomically rewrite a record's identity
    ///
    /// Removes the old row and inserts the replacement as a single
    /// transaction, keeping the original local id so the presentation layer
    /// can keep its stable key. Used by the sync engine to attach the
    /// server-assigned remote id after a successful insert. A crash leaves
    /// either the old row or the new row durable, never neither.
    pub async fn replace_identity(
        &self,
        old_local_id: i64,
        new_record: &TodoRecord,
    ) -> Result<TodoRecord> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM todos WHERE local_id = ?")
            .bind(old_local_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(SyncError::not_found(format!("todo {}", old_local_id)));
        }

        sqlx::query(
            "INSERT INTO todos (local_id, remote_id, text, done, owner_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(old_local_id)
        .bind(&new_record.remote_id)
        .bind(&new_record.text)
        .bind(new_record.done)
        .bind(&new_record.owner_id)
        .bind(&new_record.created_at)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        match self.get(old_local_id).await? {
            Some(record) => Ok(record),
            None => Err(SyncError::not_found(format!("todo {}", old_local_id))),
        }
    }

    /// Pending remote deletes, oldest first
    pub async fn pending_tombstones(&self) -> Result<Vec<Tombstone>> {
        let rows = sqlx::query(
            "SELECT remote_id, deleted_at FROM remote_tombstones ORDER BY deleted_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tombstones = Vec::with_capacity(rows.len());
        for row in rows {
            tombstones.push(Tombstone {
                remote_id: row.try_get("remote_id")?,
                deleted_at: row.try_get("deleted_at")?,
            });
        }
        Ok(tombstones)
    }

    /// Drop a tombstone once the remote delete is acknowledged
    pub async fn clear_tombstone(&self, remote_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM remote_tombstones WHERE remote_id = ?")
            .bind(remote_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set a sync metadata value
    pub async fn set_sync_metadata(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sync_metadata (key, value, updated_at) VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a sync metadata value
    pub async fn get_sync_metadata(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM sync_metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// Timestamp of the last completed reconciliation pass
    pub async fn last_sync_time(&self) -> Result<Option<String>> {
        self.get_sync_metadata("last_sync_time").await
    }

    /// Record that a reconciliation pass just completed
    pub async fn record_sync_time(&self) -> Result<()> {
        self.set_sync_metadata("last_sync_time", &chrono::Utc::now().to_rfc3339())
            .await
    }
}

/// Map a database row to a todo record
fn row_to_todo(row: &SqliteRow) -> Result<TodoRecord> {
    Ok(TodoRecord {
        local_id: row.try_get("local_id")?,
        remote_id: row.try_get("remote_id")?,
        text: row.try_get("text")?,
        done: row.try_get("done")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
