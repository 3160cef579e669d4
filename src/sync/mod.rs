//! # Synchronization Module
//!
//! The offline/online reconciliation machinery:
//!
//! - [`engine`]: the reconciliation algorithm over a local snapshot
//! - [`monitor`]: debounced connectivity transition detection
//! - [`coordinator`]: single-flight serialization of every sync trigger
//!
//! The engine is pure with respect to its inputs (session and stores);
//! the coordinator owns the mutable session/connectivity state and is the
//! only entry point the presentation layer should call.

pub mod coordinator;
pub mod engine;
pub mod monitor;

pub use coordinator::SyncCoordinator;
pub use engine::{DeleteOutcome, ItemOutcome, SessionEpoch, SyncEngine, SyncReport};
pub use monitor::{ConnectivityMonitor, NetworkStatus, Transition};
