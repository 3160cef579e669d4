//! In-Memory Remote Store
//!
//! A fully functional [`RemoteStore`] implementation held in process
//! memory. Used by the test suite and by local development when no server
//! is reachable. Beyond the plain store behavior it offers the knobs the
//! tests need: call counters, an offline switch, targeted failure
//! injection, artificial latency and an insert hook.

use crate::error::{Result, SyncError};
use crate::remote::{RemoteStore, RemoteTodo};
use crate::session::SessionContext;
use crate::types::TodoPatch;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Callback invoked just before an insert commits
pub type InsertHook = Box<dyn Fn() + Send + Sync>;

/// In-memory remote document store
#[derive(Default)]
pub struct MemoryRemoteStore {
    documents: RwLock<HashMap<String, RemoteTodo>>,
    offline: RwLock<bool>,
    fail_text: RwLock<Option<String>>,
    latency: RwLock<Option<Duration>>,
    on_insert: RwLock<Option<InsertHook>>,
    insert_count: AtomicUsize,
    update_count: AtomicUsize,
    delete_count: AtomicUsize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate total loss of connectivity
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    /// Fail inserts and updates for documents whose text contains `needle`
    pub async fn fail_when_text_contains(&self, needle: Option<&str>) {
        *self.fail_text.write().await = needle.map(str::to_string);
    }

    /// Delay every operation, to hold a reconciliation pass open
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    /// Run a callback just before each insert commits
    pub async fn set_insert_hook(&self, hook: Option<InsertHook>) {
        *self.on_insert.write().await = hook;
    }

    /// Number of inserts attempted against the store
    pub fn insert_count(&self) -> usize {
        self.insert_count.load(Ordering::SeqCst)
    }

    /// Number of updates attempted against the store
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    /// Number of deletes attempted against the store
    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored document
    pub async fn documents(&self) -> Vec<RemoteTodo> {
        self.documents.read().await.values().cloned().collect()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Common entry checks shared by every operation
    async fn gate(&self, session: &SessionContext) -> Result<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if !session.is_authenticated() {
            return Err(SyncError::Unauthenticated);
        }
        if *self.offline.read().await {
            return Err(SyncError::remote_unavailable("simulated offline"));
        }
        Ok(())
    }

    /// Whether failure injection matches the given text
    async fn injected_failure(&self, text: &str) -> bool {
        match self.fail_text.read().await.as_deref() {
            Some(needle) => text.contains(needle),
            None => false,
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn insert(&self, session: &SessionContext, text: &str, done: bool) -> Result<String> {
        self.insert_count.fetch_add(1, Ordering::SeqCst);
        self.gate(session).await?;

        if self.injected_failure(text).await {
            return Err(SyncError::remote_unavailable("injected insert failure"));
        }

        if let Some(hook) = self.on_insert.read().await.as_ref() {
            hook();
        }

        let remote_id = Uuid::new_v4().to_string();
        let document = RemoteTodo {
            remote_id: remote_id.clone(),
            text: text.to_string(),
            done,
            owner_id: session.principal_id().to_string(),
        };

        self.documents.write().await.insert(remote_id.clone(), document);
        Ok(remote_id)
    }

    async fn update(
        &self,
        session: &SessionContext,
        remote_id: &str,
        patch: &TodoPatch,
    ) -> Result<()> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.gate(session).await?;

        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(remote_id)
            .ok_or_else(|| SyncError::not_found("remote document"))?;

        if let Some(text) = &patch.text {
            if self.injected_failure(text).await {
                return Err(SyncError::remote_unavailable("injected update failure"));
            }
            document.text = text.clone();
        }
        if let Some(done) = patch.done {
            document.done = done;
        }

        Ok(())
    }

    async fn delete(&self, session: &SessionContext, remote_id: &str) -> Result<()> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        self.gate(session).await?;

        match self.documents.write().await.remove(remote_id) {
            Some(_) => Ok(()),
            None => Err(SyncError::not_found("remote document")),
        }
    }

    async fn list_by_owner(&self, session: &SessionContext) -> Result<Vec<RemoteTodo>> {
        self.gate(session).await?;

        let owner = session.principal_id();
        Ok(self
            .documents
            .read()
            .await
            .values()
            .filter(|doc| doc.owner_id == owner)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionContext {
        SessionContext::new("user-1", "u1@example.com", "token-1")
    }

    #[tokio::test]
    async fn test_insert_update_delete_roundtrip() {
        let store = MemoryRemoteStore::new();
        let session = session();

        let remote_id = store.insert(&session, "Buy milk", false).await.unwrap();
        assert_eq!(store.len().await, 1);

        store
            .update(&session, &remote_id, &TodoPatch::done(true))
            .await
            .unwrap();
        let docs = store.documents().await;
        assert!(docs[0].done);
        assert_eq!(docs[0].text, "Buy milk");

        store.delete(&session, &remote_id).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryRemoteStore::new();
        let result = store
            .update(&session(), "missing", &TodoPatch::done(true))
            .await;
        assert!(matches!(result, Err(SyncError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_offline_flag_fails_operations() {
        let store = MemoryRemoteStore::new();
        store.set_offline(true).await;

        let result = store.insert(&session(), "unreachable", false).await;
        assert!(matches!(result, Err(SyncError::RemoteUnavailable { .. })));
        assert_eq!(store.insert_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_owner() {
        let store = MemoryRemoteStore::new();
        let alice = SessionContext::new("alice", "a@example.com", "t-a");
        let bob = SessionContext::new("bob", "b@example.com", "t-b");

        store.insert(&alice, "hers", false).await.unwrap();
        store.insert(&bob, "his", false).await.unwrap();

        let listed = store.list_by_owner(&alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "hers");
    }

    #[tokio::test]
    async fn test_anonymous_session_is_rejected() {
        let store = MemoryRemoteStore::new();
        let result = store
            .insert(&SessionContext::anonymous(), "nope", false)
            .await;
        assert!(matches!(result, Err(SyncError::Unauthenticated)));
    }
}
