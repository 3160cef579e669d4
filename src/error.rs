//! Error Types
//!
//! This module defines the error taxonomy shared by the local store, the
//! remote store clients and the sync engine.
//!
//! # Error Categories
//!
//! - `StorageUnavailable` - local persistence inaccessible (fatal to the session)
//! - `RemoteUnavailable` - transient network/server failure (deferred to the next pass)
//! - `NotFound` - a referenced record is missing
//! - `Unauthenticated` - no valid session
//! - `InvalidCredentials` / `AccountExists` - user-facing authentication failures
//!
//! # Usage
//!
//! ```rust
//! use syncpad::error::SyncError;
//!
//! // Create a remote-side error
//! let error = SyncError::remote_unavailable("connection refused");
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors produced by local storage, remote access and reconciliation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Local persistence is inaccessible
    ///
    /// Fatal to the session: without the local store there is nothing to
    /// mutate or reconcile. Surfaced to the caller.
    #[error("local storage unavailable: {message}")]
    StorageUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// Transient network or server failure
    ///
    /// Recovered by deferring the affected item to the next reconciliation
    /// pass; never surfaced per item.
    #[error("remote store unavailable: {message}")]
    RemoteUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// A referenced record does not exist
    #[error("not found: {what}")]
    NotFound {
        /// What was being looked up
        what: String,
    },

    /// No authenticated session
    ///
    /// Offline, signed-out use is a supported mode: callers skip
    /// reconciliation on this error instead of reporting it to the user.
    #[error("no authenticated session")]
    Unauthenticated,

    /// The session changed while a reconciliation pass was in flight
    ///
    /// The remote call completed but its result was discarded rather than
    /// applied under a stale identity; the item is retried next pass.
    #[error("session changed during reconciliation")]
    StaleSession,

    /// Login rejected by the authentication service
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration rejected because the account already exists
    #[error("account already exists")]
    AccountExists,
}

impl SyncError {
    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Create a new remote-availability error
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Whether the error is transient and the work should be retried on a
    /// later pass rather than treated as final
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. } | Self::StaleSession)
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("database row"),
            other => Self::storage(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::remote_unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::remote_unavailable(format!("malformed response: {}", err))
    }
}
