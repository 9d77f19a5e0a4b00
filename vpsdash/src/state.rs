//! Shared dashboard state: one writer (the sync core), any number of readers.
//!
//! Every mutation goes through a single `watch` send, so readers never see a
//! snapshot without its history pushes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::history::Histories;
use crate::scan::ScanSession;
use crate::types::{ServerInfo, Snapshot};

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub connected: bool,
    pub snapshot: Option<Arc<Snapshot>>,
    pub history: Histories,
    pub scan: ScanSession,
    pub server_info: Option<ServerInfo>,
    pub scan_cache_ttl: Option<Duration>,
}

#[derive(Clone)]
pub struct SharedState {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl SharedState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DashboardState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    /// Clone of the current state.
    pub fn get(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn is_connected(&self) -> bool {
        self.tx.borrow().connected
    }

    pub fn scan_running(&self) -> bool {
        self.tx.borrow().scan.is_running()
    }

    pub fn set_connected(&self, connected: bool) {
        self.tx.send_if_modified(|s| {
            let changed = s.connected != connected;
            s.connected = connected;
            changed
        });
    }

    /// Replace the current snapshot and push every history series, as one commit.
    pub fn commit_snapshot(&self, snapshot: Snapshot) {
        self.tx.send_modify(|s| {
            s.history = s.history.record(&snapshot);
            s.snapshot = Some(Arc::new(snapshot));
        });
    }

    /// Mutate the scan session; `f` returns whether anything changed.
    pub fn update_scan(&self, f: impl FnOnce(&mut ScanSession) -> bool) -> bool {
        self.tx.send_if_modified(|s| f(&mut s.scan))
    }

    pub fn set_server_info(&self, info: ServerInfo) {
        self.tx.send_modify(|s| {
            if let Some(secs) = info.cache_ttl_secs() {
                s.scan_cache_ttl = Some(Duration::from_secs(secs));
            }
            s.server_info = Some(info);
        });
    }

    pub fn set_scan_cache_ttl(&self, ttl: Duration) {
        self.tx.send_modify(|s| s.scan_cache_ttl = Some(ttl));
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
