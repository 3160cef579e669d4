//! Shared helpers for integration tests
//!
//! Provides a scratch local store, a ready sync engine over the in-memory
//! remote store, and a canned session.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use syncpad::local_db::LocalStore;
use syncpad::remote::MemoryRemoteStore;
use syncpad::session::SessionContext;
use syncpad::sync::{SyncCoordinator, SyncEngine};
use tempfile::TempDir;

/// A local store backed by a temporary directory
///
/// The directory must stay alive for the duration of the test.
pub async fn temp_store() -> (TempDir, LocalStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = LocalStore::open(dir.path().join("local.db"))
        .await
        .expect("open local store");
    (dir, store)
}

/// A sync engine over a fresh store and a fresh in-memory remote
pub async fn temp_engine() -> (TempDir, Arc<MemoryRemoteStore>, SyncEngine<MemoryRemoteStore>) {
    let (dir, store) = temp_store().await;
    let remote = Arc::new(MemoryRemoteStore::new());
    let engine = SyncEngine::new(store, Arc::clone(&remote));
    (dir, remote, engine)
}

/// A coordinator over a fresh store and a fresh in-memory remote
pub async fn temp_coordinator() -> (
    TempDir,
    Arc<MemoryRemoteStore>,
    SyncCoordinator<MemoryRemoteStore>,
) {
    let (dir, remote, engine) = temp_engine().await;
    let coordinator = SyncCoordinator::new(engine, Duration::from_millis(50));
    (dir, remote, coordinator)
}

/// An authenticated session for the default test principal
pub fn session() -> SessionContext {
    SessionContext::new("user-1", "user1@example.com", "token-1")
}

/// An authenticated session for a second principal
pub fn other_session() -> SessionContext {
    SessionContext::new("user-2", "user2@example.com", "token-2")
}
