//! Core Data Types
//!
//! Record and patch types shared by the local store, the remote store
//! clients and the sync engine.

use serde::{Deserialize, Serialize};

/// A single todo item as stored locally
///
/// The `local_id` is assigned by [`LocalStore`](crate::local_db::LocalStore)
/// at creation time and is the only identifier the presentation layer may
/// use. The `remote_id` is assigned by the remote store on first successful
/// push and is internal to the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Local integer identifier, unique and never reused
    pub local_id: i64,
    /// Server-assigned opaque identifier, present once synced
    pub remote_id: Option<String>,
    /// User-supplied text content
    pub text: String,
    /// Completion flag
    pub done: bool,
    /// Owning principal, absent until first successful sync
    pub owner_id: Option<String>,
    /// Creation timestamp, RFC 3339
    pub created_at: String,
    /// Last-modification timestamp, RFC 3339
    pub updated_at: String,
}

impl TodoRecord {
    /// Whether the record has ever been durably synced
    pub fn is_synced(&self) -> bool {
        self.remote_id.is_some()
    }
}

/// Partial update applied to a todo record
///
/// Fields left as `None` are untouched by the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New text content, if changing
    pub text: Option<String>,
    /// New completion flag, if changing
    pub done: Option<bool>,
}

impl TodoPatch {
    /// Patch that replaces the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            done: None,
        }
    }

    /// Patch that sets the completion flag
    pub fn done(done: bool) -> Self {
        Self {
            text: None,
            done: Some(done),
        }
    }

    /// Whether the patch changes anything
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.done.is_none()
    }
}
