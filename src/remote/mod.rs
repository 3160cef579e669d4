//! # Remote Store Module
//!
//! The consumed interface of the authoritative remote document store, plus
//! its two implementations: the HTTP transport used in production and an
//! in-memory double used by tests and local development.
//!
//! The client never implements the server. Everything the engine needs is
//! captured in the [`RemoteStore`] trait: insert, update, delete and an
//! owner-scoped listing, all requiring an authenticated session.

pub mod http;
pub mod memory;

use crate::error::Result;
use crate::session::SessionContext;
use crate::types::TodoPatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

/// A todo document as held by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTodo {
    /// Server-assigned permanent identifier
    pub remote_id: String,
    /// Text content
    pub text: String,
    /// Completion flag
    pub done: bool,
    /// Owning principal
    pub owner_id: String,
}

/// The authoritative remote persistence, scoped per authenticated principal
///
/// All operations fail with `Unauthenticated` when the session carries no
/// principal, with `RemoteUnavailable` on transport failure, and with
/// `NotFound` when a referenced document no longer exists.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a new document scoped to the session's principal
    ///
    /// Returns the server-assigned identifier.
    async fn insert(&self, session: &SessionContext, text: &str, done: bool) -> Result<String>;

    /// Update fields on an existing document by its permanent identifier
    ///
    /// Must be idempotent for identical payloads: repeating an update with
    /// the same fields is safe.
    async fn update(
        &self,
        session: &SessionContext,
        remote_id: &str,
        patch: &TodoPatch,
    ) -> Result<()>;

    /// Delete a document by its permanent identifier
    async fn delete(&self, session: &SessionContext, remote_id: &str) -> Result<()>;

    /// The authoritative document set for the session's principal
    async fn list_by_owner(&self, session: &SessionContext) -> Result<Vec<RemoteTodo>>;
}
