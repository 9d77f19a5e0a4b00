//! Scan session controller: start / cancel / poll a server-side directory scan.
//!
//! One session is tracked at a time. A new start supersedes whatever is shown;
//! cancel always lands in `Idle` locally, even if the request fails.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::control::ControlClient;
use crate::error::Result;
use crate::state::SharedState;
use crate::types::{ScanResult, ScanStatus, StartMode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSession {
    pub state: ScanState,
    pub path: String,
    pub result: Option<Arc<ScanResult>>,
    pub error: Option<String>,
    // bumped by start/cancel; poll replies from an older epoch are dropped
    epoch: u64,
}

impl ScanSession {
    pub fn is_running(&self) -> bool {
        self.state == ScanState::Running
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn begin(&mut self, path: &str) {
        self.epoch += 1;
        self.state = ScanState::Running;
        self.path = path.to_string();
        self.result = None;
        self.error = None;
    }

    fn clear(&mut self) {
        self.epoch += 1;
        self.state = ScanState::Idle;
        self.result = None;
        self.error = None;
    }

    /// Fold a status reply into the session.
    fn absorb(&mut self, result: ScanResult) {
        match result.status {
            ScanStatus::Done => {
                self.state = ScanState::Done;
                self.error = None;
            }
            ScanStatus::Error => {
                self.state = ScanState::Error;
                self.error = Some(
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| "scan failed".to_string()),
                );
            }
            ScanStatus::Running => {
                self.state = ScanState::Running;
            }
            ScanStatus::Idle => {}
        }
        if !result.path.is_empty() {
            self.path = result.path.clone();
        }
        self.result = Some(Arc::new(result));
    }
}

#[derive(Clone)]
pub struct ScanController {
    client: ControlClient,
    state: SharedState,
}

impl ScanController {
    pub fn new(client: ControlClient, state: SharedState) -> Self {
        Self { client, state }
    }

    /// Ask the backend to scan `path`. The session shows `Running` immediately;
    /// if the request fails it falls back to `Idle` and the error is returned.
    /// A failed follow-up poll is only logged.
    pub async fn start(&self, path: &str) -> Result<StartMode> {
        let mut epoch = 0;
        self.state.update_scan(|s| {
            s.begin(path);
            epoch = s.epoch;
            true
        });
        info!(path, "starting scan");

        let reply = match self.client.start_scan(path).await {
            Ok(r) => r,
            Err(e) => {
                warn!(path, error = %e, "scan start failed");
                self.state.update_scan(|s| {
                    if s.epoch != epoch {
                        return false;
                    }
                    s.clear();
                    true
                });
                return Err(e);
            }
        };

        debug!(path, mode = ?reply.status, "scan start accepted");
        // the scan is underway either way; the next readiness edge retries
        if reply.status.wants_immediate_poll() {
            if let Err(e) = self.poll().await {
                warn!(path, error = %e, "status poll after start failed");
            }
        }
        Ok(reply.status)
    }

    /// Best effort: the session is cleared whether or not the request succeeds.
    pub async fn cancel(&self) {
        if let Err(e) = self.client.cancel_scan().await {
            warn!(error = %e, "scan cancel request failed; clearing locally");
        }
        self.state.update_scan(|s| {
            s.clear();
            true
        });
        info!("scan cancelled");
    }

    /// Fetch the current status and fold it into the session.
    pub async fn poll(&self) -> Result<ScanStatus> {
        let epoch = self.state.read(|s| s.scan.epoch);
        let result = self.client.scan_status().await?;
        let status = result.status;
        let applied = self.state.update_scan(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.absorb(result);
            true
        });
        if applied {
            debug!(status = ?status, "scan status applied");
        } else {
            debug!(status = ?status, "dropping stale scan status");
        }
        Ok(status)
    }

    pub async fn refresh_cache_ttl(&self) -> Result<Duration> {
        let reply = self.client.cache_ttl().await?;
        let ttl = Duration::from_secs(reply.cache_ttl_sec);
        self.state.set_scan_cache_ttl(ttl);
        Ok(ttl)
    }

    pub async fn set_cache_ttl(&self, secs: u64) -> Result<Duration> {
        let reply = self.client.set_cache_ttl(secs.max(1)).await?;
        let ttl = Duration::from_secs(reply.cache_ttl_sec);
        self.state.set_scan_cache_ttl(ttl);
        Ok(ttl)
    }
}
