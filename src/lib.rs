//! syncpad - Offline-First Todo Synchronization
//!
//! syncpad keeps a list of short text items usable while offline and
//! reconciles it with a shared remote store once connectivity returns.
//! Every mutation is persisted locally first; a reconciliation engine
//! pushes pending state to the remote store whenever a connectivity
//! transition or a fresh mutation provides a trigger.
//!
//! # Overview
//!
//! The crate provides:
//! - Durable local persistence that survives restarts and works with no
//!   network and no account
//! - A reconciliation engine that pushes creates, updates and deletes to
//!   the remote store with per-item failure isolation
//! - Promotion of locally-assigned temporary identifiers to the
//!   server-assigned permanent ones
//! - Debounced connectivity transition detection and single-flight
//!   serialization of sync triggers
//!
//! # Module Structure
//!
//! - **`local_db`** - SQLite-backed [`LocalStore`](local_db::LocalStore):
//!   record CRUD, identity promotion, tombstones, sync metadata
//! - **`remote`** - the consumed [`RemoteStore`](remote::RemoteStore)
//!   interface plus its HTTP and in-memory implementations
//! - **`sync`** - the [`SyncEngine`](sync::SyncEngine), the
//!   [`ConnectivityMonitor`](sync::ConnectivityMonitor) and the
//!   [`SyncCoordinator`](sync::SyncCoordinator)
//! - **`session`** - [`SessionContext`](session::SessionContext) and the
//!   login/registration client
//! - **`config`**, **`error`**, **`types`** - configuration, the error
//!   taxonomy and the shared record types
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use syncpad::local_db::LocalStore;
//! use syncpad::remote::MemoryRemoteStore;
//! use syncpad::sync::{SyncCoordinator, SyncEngine};
//!
//! # async fn example() -> syncpad::error::Result<()> {
//! let store = LocalStore::open("/tmp/syncpad/local.db").await?;
//! let engine = SyncEngine::new(store, Arc::new(MemoryRemoteStore::new()));
//! let sync = SyncCoordinator::new(engine, Duration::from_secs(2));
//!
//! // Mutations always succeed locally, signed in or not
//! let id = sync.store().create("Buy milk").await?;
//!
//! // Reconciliation is requested opportunistically; it silently skips
//! // while offline or signed out
//! sync.request_sync().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! All state is thread-safe. At most one reconciliation pass is in flight
//! at a time: the coordinator coalesces triggers that arrive mid-pass into
//! a single follow-up pass, so a pending record can never be inserted
//! remotely twice.
//!
//! # Error Handling
//!
//! One taxonomy, [`error::SyncError`], distinguishes fatal local-storage
//! failures from transient remote failures. During reconciliation,
//! per-item errors are collected into a [`sync::SyncReport`] and logged;
//! they never abort the pass. "Some items not yet synced" is the normal
//! steady state of an offline-first store, not an error.

/// Configuration loading and builder
pub mod config;

/// Error taxonomy
pub mod error;

/// Local SQLite persistence
pub mod local_db;

/// Remote store interface and implementations
pub mod remote;

/// Session context and authentication client
pub mod session;

/// Reconciliation engine, connectivity monitor, sync coordinator
pub mod sync;

/// Shared record types
pub mod types;

pub use config::Config;
pub use error::{Result, SyncError};
pub use local_db::LocalStore;
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore, RemoteTodo};
pub use session::{AuthClient, SessionContext};
pub use sync::{SyncCoordinator, SyncEngine, SyncReport};
pub use types::{TodoPatch, TodoRecord};
