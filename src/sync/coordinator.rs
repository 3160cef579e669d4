//! # Sync Coordinator
//!
//! Serializes every reconciliation trigger through a single entry point.
//!
//! The central resource-sharing rule of the system lives here: **at most
//! one reconciliation pass is in flight at a time**. A trigger arriving
//! while a pass runs is coalesced into one follow-up pass instead of
//! running concurrently, because two concurrent passes could both insert
//! the same pending record remotely and produce duplicates. The guarantee
//! is structural (a mutex plus a rerun flag), never left to scheduling
//! luck.
//!
//! The coordinator also owns the current session (bumping the engine's
//! [`SessionEpoch`](crate::sync::SessionEpoch) on every change) and the
//! [`ConnectivityMonitor`], wiring its transitions to sync requests.

use crate::error::Result;
use crate::local_db::LocalStore;
use crate::remote::RemoteStore;
use crate::session::SessionContext;
use crate::sync::engine::{SyncEngine, SyncReport};
use crate::sync::monitor::{ConnectivityMonitor, Transition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Serializing front door for reconciliation
pub struct SyncCoordinator<R: RemoteStore> {
    engine: SyncEngine<R>,
    session: RwLock<Option<SessionContext>>,
    monitor: StdMutex<ConnectivityMonitor>,
    /// Last connectivity sample; assumed online until told otherwise so a
    /// caller that never wires a connectivity source still syncs (a pass
    /// attempted while actually offline just defers every item).
    online: AtomicBool,
    in_flight: Mutex<()>,
    rerun_pending: AtomicBool,
    last_report: RwLock<Option<SyncReport>>,
}

impl<R: RemoteStore> SyncCoordinator<R> {
    pub fn new(engine: SyncEngine<R>, debounce: Duration) -> Self {
        Self {
            engine,
            session: RwLock::new(None),
            monitor: StdMutex::new(ConnectivityMonitor::new(debounce)),
            online: AtomicBool::new(true),
            in_flight: Mutex::new(()),
            rerun_pending: AtomicBool::new(false),
            last_report: RwLock::new(None),
        }
    }

    /// The local store behind the engine
    pub fn store(&self) -> &LocalStore {
        self.engine.store()
    }

    /// Install or clear the session
    ///
    /// Every change bumps the session epoch so a pass started under the old
    /// identity cannot write its results back. Installing a session also
    /// requests a pass: the first availability of a session is a sync
    /// trigger of its own.
    pub async fn set_session(&self, session: Option<SessionContext>) -> Result<Option<SyncReport>> {
        self.engine.epoch().bump();
        let has_session = session.is_some();
        *self.session.write().await = session;

        if has_session {
            self.request_sync().await
        } else {
            Ok(None)
        }
    }

    /// Current session, if any
    pub async fn session(&self) -> Option<SessionContext> {
        self.session.read().await.clone()
    }

    /// Feed one connectivity sample
    ///
    /// An offline-to-online transition (debounced by the monitor) requests
    /// exactly one pass.
    pub async fn observe_connectivity(&self, is_online: bool) -> Result<Option<SyncReport>> {
        let transition = {
            let mut monitor = self.monitor.lock().expect("connectivity monitor poisoned");
            monitor.observe(is_online, Instant::now())
        };
        self.online.store(is_online, Ordering::SeqCst);

        match transition {
            Transition::CameOnline => self.request_sync().await,
            _ => Ok(None),
        }
    }

    /// Request a reconciliation pass
    ///
    /// Returns `Ok(None)` without work when offline or signed out (both are
    /// supported steady states, not errors) and when a pass is already in
    /// flight; in the latter case the request is coalesced into a follow-up
    /// pass run by the in-flight caller.
    pub async fn request_sync(&self) -> Result<Option<SyncReport>> {
        if !self.online.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let Some(session) = self.session().await else {
            return Ok(None);
        };

        let guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.rerun_pending.store(true, Ordering::SeqCst);
                return Ok(None);
            }
        };

        let mut report = self.engine.reconcile(&session).await?;

        // Triggers that arrived mid-pass run now, still under the lock
        while self.rerun_pending.swap(false, Ordering::SeqCst) {
            let Some(session) = self.session().await else {
                break;
            };
            report = self.engine.reconcile(&session).await?;
        }
        drop(guard);

        *self.last_report.write().await = Some(report.clone());
        Ok(Some(report))
    }

    /// Adopt remote documents missing locally (used right after login)
    pub async fn import_remote(&self) -> Result<usize> {
        let Some(session) = self.session().await else {
            return Ok(0);
        };
        self.engine.import_remote(&session).await
    }

    /// The report of the most recently completed pass
    pub async fn last_report(&self) -> Option<SyncReport> {
        self.last_report.read().await.clone()
    }
}
