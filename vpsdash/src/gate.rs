//! Update gate: decides which pushed snapshots reach shared state.
//!
//! The connection stays open while paused; the gate just drops snapshots.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

/// Lower bound for the refresh interval.
pub const MIN_INTERVAL_MS: u64 = 250;
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.max(MIN_INTERVAL_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    frozen: bool,
    min_interval_ms: u64,
    // bumped on every frozen -> unfrozen transition
    resumes: u64,
}

impl GateConfig {
    pub fn new(frozen: bool, min_interval_ms: u64) -> Self {
        Self {
            frozen,
            min_interval_ms: clamp_interval_ms(min_interval_ms),
            resumes: 0,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        if self.frozen && !frozen {
            self.resumes += 1;
        }
        self.frozen = frozen;
    }

    pub fn set_min_interval_ms(&mut self, ms: u64) {
        self.min_interval_ms = clamp_interval_ms(ms);
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(false, DEFAULT_INTERVAL_MS)
    }
}

/// Runtime handle for changing the gate without restarting the connection.
#[derive(Clone)]
pub struct GateHandle {
    tx: Arc<watch::Sender<GateConfig>>,
}

impl GateHandle {
    pub fn new(config: GateConfig) -> Self {
        let (tx, _rx) = watch::channel(config);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> GateConfig {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateConfig> {
        self.tx.subscribe()
    }

    pub fn set_frozen(&self, frozen: bool) {
        self.tx.send_if_modified(|c| {
            let before = *c;
            c.set_frozen(frozen);
            *c != before
        });
    }

    pub fn set_min_interval_ms(&self, ms: u64) {
        self.tx.send_if_modified(|c| {
            let before = *c;
            c.set_min_interval_ms(ms);
            *c != before
        });
    }
}

impl Default for GateHandle {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

#[derive(Debug, Default)]
pub struct UpdateGate {
    // None until the first acceptance, and again after every resume
    last_accepted: Option<Instant>,
    seen_resumes: u64,
}

impl UpdateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a snapshot arriving at `now` should be applied.
    pub fn apply(&mut self, now: Instant, config: &GateConfig) -> bool {
        if config.resumes != self.seen_resumes {
            self.seen_resumes = config.resumes;
            self.last_accepted = None;
        }
        if config.frozen {
            return false;
        }
        if let Some(prev) = self.last_accepted {
            let elapsed = now.saturating_duration_since(prev);
            if elapsed < config.min_interval() {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "snapshot throttled");
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }
}
