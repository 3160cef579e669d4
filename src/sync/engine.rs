//! # Reconciliation Engine
//!
//! Walks the local record set and pushes pending state to the remote
//! store: remote deletes for tombstones, inserts for records that have
//! never been pushed, updates for records that already carry their
//! permanent identifier.
//!
//! The engine is deliberately a pure function of its inputs plus its two
//! stores: the session arrives as an explicit argument and connectivity is
//! the caller's concern, so every behavior is testable without a network.
//!
//! ## Failure isolation
//!
//! Items are processed independently. A failure on one item is recorded in
//! the [`SyncReport`] and logged; it never aborts the pass. Partial
//! progress is the expected steady state of an offline-first store, so the
//! pass itself returns `Ok` even when individual items failed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use syncpad::local_db::LocalStore;
//! use syncpad::remote::MemoryRemoteStore;
//! use syncpad::sync::SyncEngine;
//! use syncpad::session::SessionContext;
//!
//! # async fn example(store: LocalStore, session: SessionContext) -> syncpad::error::Result<()> {
//! let engine = SyncEngine::new(store, Arc::new(MemoryRemoteStore::new()));
//! let report = engine.reconcile(&session).await?;
//! tracing::info!("synced {} items", report.synced_count());
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SyncError};
use crate::local_db::LocalStore;
use crate::remote::RemoteStore;
use crate::session::SessionContext;
use crate::types::{TodoPatch, TodoRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter distinguishing the session a pass started under from
/// the session current at write-back time
///
/// Bumped by the owner on every login/logout. The engine captures the value
/// when a pass starts and refuses to apply remote results locally once it
/// moved: in-flight calls complete, their results are discarded.
#[derive(Debug, Default)]
pub struct SessionEpoch(AtomicU64);

impl SessionEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance to a new generation
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Outcome of pushing a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The record reached the remote store and carries its permanent id
    Synced {
        local_id: i64,
        remote_id: String,
    },
    /// Transient failure; the record stays pending for the next pass
    Deferred {
        local_id: i64,
        error: SyncError,
    },
    /// The remote write landed but the local write-back failed
    Fatal {
        local_id: i64,
        error: SyncError,
    },
}

/// Outcome of flushing a single tombstone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The remote document is gone and the tombstone cleared
    Deleted { remote_id: String },
    /// Transient failure; the tombstone stays for the next pass
    Deferred { remote_id: String, error: SyncError },
}

/// Explicit per-item result list of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One outcome per record in the pass snapshot
    pub items: Vec<ItemOutcome>,
    /// One outcome per pending tombstone
    pub deletes: Vec<DeleteOutcome>,
}

impl SyncReport {
    /// Number of records that reached the remote store this pass
    pub fn synced_count(&self) -> usize {
        self.items
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Synced { .. }))
            .count()
    }

    /// Number of records deferred to a later pass
    pub fn deferred_count(&self) -> usize {
        self.items
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Deferred { .. }))
            .count()
    }

    /// Number of records whose local write-back failed
    pub fn fatal_count(&self) -> usize {
        self.items
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Fatal { .. }))
            .count()
    }

    /// Whether every item and tombstone in the pass succeeded
    pub fn is_clean(&self) -> bool {
        self.deferred_count() == 0
            && self.fatal_count() == 0
            && self
                .deletes
                .iter()
                .all(|d| matches!(d, DeleteOutcome::Deleted { .. }))
    }
}

/// The reconciliation engine
///
/// Generic over the remote store so tests run against the in-memory
/// implementation and production against the HTTP one.
#[derive(Debug)]
pub struct SyncEngine<R: RemoteStore> {
    store: LocalStore,
    remote: Arc<R>,
    epoch: Arc<SessionEpoch>,
}

impl<R: RemoteStore> SyncEngine<R> {
    pub fn new(store: LocalStore, remote: Arc<R>) -> Self {
        Self {
            store,
            remote,
            epoch: Arc::new(SessionEpoch::new()),
        }
    }

    /// The stale-session guard shared with whoever owns the session
    pub fn epoch(&self) -> &Arc<SessionEpoch> {
        &self.epoch
    }

    /// The local store this engine reconciles
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Run one reconciliation pass
    ///
    /// Takes a single snapshot of the local store; mutations arriving after
    /// the snapshot wait for the next pass. Per-item failures are collected
    /// in the returned report and logged, never raised: the pass only fails
    /// as a whole on `Unauthenticated` or when the local store itself is
    /// unavailable.
    pub async fn reconcile(&self, session: &SessionContext) -> Result<SyncReport> {
        if !session.is_authenticated() {
            return Err(SyncError::Unauthenticated);
        }

        let epoch = self.epoch.current();
        let mut report = SyncReport::default();

        for tombstone in self.store.pending_tombstones().await? {
            let outcome = self
                .flush_tombstone(session, epoch, &tombstone.remote_id)
                .await?;
            if let DeleteOutcome::Deferred { remote_id, error } = &outcome {
                tracing::warn!(%remote_id, %error, "remote delete deferred");
            }
            report.deletes.push(outcome);
        }

        let snapshot = self.store.list_all().await?;
        tracing::debug!(records = snapshot.len(), "reconciliation snapshot taken");

        for record in &snapshot {
            let outcome = self.push_record(session, epoch, record).await?;
            match &outcome {
                ItemOutcome::Deferred { local_id, error } => {
                    tracing::warn!(local_id, %error, "push deferred");
                }
                ItemOutcome::Fatal { local_id, error } => {
                    tracing::error!(local_id, %error, "local write-back failed");
                }
                ItemOutcome::Synced { .. } => {}
            }
            report.items.push(outcome);
        }

        self.store.record_sync_time().await?;
        tracing::info!(
            synced = report.synced_count(),
            deferred = report.deferred_count(),
            deletes = report.deletes.len(),
            "reconciliation pass complete"
        );

        Ok(report)
    }

    /// Adopt remote documents that have no local counterpart
    ///
    /// Used after signing in on a device whose local store has never seen
    /// the account's documents. Existing local records are left untouched;
    /// only documents with an unknown remote id are inserted. Returns the
    /// number of adopted records.
    pub async fn import_remote(&self, session: &SessionContext) -> Result<usize> {
        if !session.is_authenticated() {
            return Err(SyncError::Unauthenticated);
        }

        let known: Vec<Option<String>> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|r| r.remote_id)
            .collect();

        let mut adopted = 0;
        for document in self.remote.list_by_owner(session).await? {
            if known.iter().flatten().any(|id| *id == document.remote_id) {
                continue;
            }
            self.store
                .insert_synced(
                    &document.remote_id,
                    &document.text,
                    document.done,
                    &document.owner_id,
                )
                .await?;
            adopted += 1;
        }

        if adopted > 0 {
            tracing::info!(adopted, "adopted remote documents");
        }
        Ok(adopted)
    }

    /// Issue the remote delete for one tombstone and clear it
    ///
    /// A remote `NotFound` counts as success: the document is already gone.
    async fn flush_tombstone(
        &self,
        session: &SessionContext,
        epoch: u64,
        remote_id: &str,
    ) -> Result<DeleteOutcome> {
        match self.remote.delete(session, remote_id).await {
            Ok(()) | Err(SyncError::NotFound { .. }) => {
                if self.epoch.current() != epoch {
                    return Ok(DeleteOutcome::Deferred {
                        remote_id: remote_id.to_string(),
                        error: SyncError::StaleSession,
                    });
                }
                self.store.clear_tombstone(remote_id).await?;
                Ok(DeleteOutcome::Deleted {
                    remote_id: remote_id.to_string(),
                })
            }
            Err(error) => Ok(DeleteOutcome::Deferred {
                remote_id: remote_id.to_string(),
                error,
            }),
        }
    }

    /// Push one record: update when it has a remote id, insert otherwise
    async fn push_record(
        &self,
        session: &SessionContext,
        epoch: u64,
        record: &TodoRecord,
    ) -> Result<ItemOutcome> {
        match &record.remote_id {
            Some(remote_id) => {
                let patch = TodoPatch {
                    text: Some(record.text.clone()),
                    done: Some(record.done),
                };
                match self.remote.update(session, remote_id, &patch).await {
                    Ok(()) => Ok(ItemOutcome::Synced {
                        local_id: record.local_id,
                        remote_id: remote_id.clone(),
                    }),
                    // The document vanished remotely (deleted out-of-band).
                    // Policy: the user's local copy wins, re-insert as new.
                    Err(SyncError::NotFound { .. }) => self.insert_record(session, epoch, record).await,
                    Err(error) => Ok(ItemOutcome::Deferred {
                        local_id: record.local_id,
                        error,
                    }),
                }
            }
            None => self.insert_record(session, epoch, record).await,
        }
    }

    /// Insert a record remotely and attach the assigned identifier locally
    async fn insert_record(
        &self,
        session: &SessionContext,
        epoch: u64,
        record: &TodoRecord,
    ) -> Result<ItemOutcome> {
        let remote_id = match self.remote.insert(session, &record.text, record.done).await {
            Ok(remote_id) => remote_id,
            Err(error) => {
                return Ok(ItemOutcome::Deferred {
                    local_id: record.local_id,
                    error,
                })
            }
        };

        // The remote write landed under the session the pass started with;
        // refuse the local write-back if that session is no longer current.
        if self.epoch.current() != epoch {
            return Ok(ItemOutcome::Deferred {
                local_id: record.local_id,
                error: SyncError::StaleSession,
            });
        }

        let promoted = TodoRecord {
            remote_id: Some(remote_id.clone()),
            owner_id: Some(session.principal_id().to_string()),
            ..record.clone()
        };

        match self.store.replace_identity(record.local_id, &promoted).await {
            Ok(_) => Ok(ItemOutcome::Synced {
                local_id: record.local_id,
                remote_id,
            }),
            // The record disappeared locally between snapshot and write-back
            // (deleted mid-pass). Undo the insert so the remote store does
            // not keep a document the user already removed.
            Err(SyncError::NotFound { .. }) => {
                if let Err(error) = self.remote.delete(session, &remote_id).await {
                    tracing::warn!(%remote_id, %error, "could not undo mid-pass insert");
                }
                Ok(ItemOutcome::Deferred {
                    local_id: record.local_id,
                    error: SyncError::StaleSession,
                })
            }
            Err(error) => Ok(ItemOutcome::Fatal {
                local_id: record.local_id,
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemoteStore;

    async fn engine() -> (tempfile::TempDir, SyncEngine<MemoryRemoteStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("local.db")).await.unwrap();
        let engine = SyncEngine::new(store, Arc::new(MemoryRemoteStore::new()));
        (dir, engine)
    }

    fn session() -> SessionContext {
        SessionContext::new("user-1", "u1@example.com", "token-1")
    }

    #[tokio::test]
    async fn test_reconcile_requires_authentication() {
        let (_dir, engine) = engine().await;
        let result = engine.reconcile(&SessionContext::anonymous()).await;
        assert!(matches!(result, Err(SyncError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_report() {
        let (_dir, engine) = engine().await;
        let report = engine.reconcile(&session()).await.unwrap();
        assert!(report.items.is_empty());
        assert!(report.deletes.is_empty());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_report_counters() {
        let report = SyncReport {
            items: vec![
                ItemOutcome::Synced {
                    local_id: 1,
                    remote_id: "r-1".to_string(),
                },
                ItemOutcome::Deferred {
                    local_id: 2,
                    error: SyncError::remote_unavailable("down"),
                },
            ],
            deletes: vec![],
        };
        assert_eq!(report.synced_count(), 1);
        assert_eq!(report.deferred_count(), 1);
        assert_eq!(report.fatal_count(), 0);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_epoch_bump_changes_generation() {
        let epoch = SessionEpoch::new();
        let before = epoch.current();
        epoch.bump();
        assert_ne!(before, epoch.current());
    }
}
