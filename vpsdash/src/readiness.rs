//! Edge detection over the backend's level-triggered "scan ready" flag.
//!
//! The flag is repeated on every heartbeat; a status fetch is only worth doing
//! when readiness rises, or when a new scan starts while a result is already
//! marked ready.

/// Decide whether the scan status should be fetched for this signal pair.
pub fn should_poll(prev_ready: bool, ready: bool, prev_scanning: bool, scanning: bool) -> bool {
    if !ready {
        return false;
    }
    if !prev_ready {
        return true;
    }
    scanning && !prev_scanning
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessTracker {
    prev_ready: bool,
    prev_scanning: bool,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one signal pair and remember it, whatever the outcome.
    pub fn observe(&mut self, ready: bool, scanning: bool) -> bool {
        let poll = should_poll(self.prev_ready, ready, self.prev_scanning, scanning);
        self.prev_ready = ready;
        self.prev_scanning = scanning;
        poll
    }

    /// Forget previous signals (used when a fresh connection comes up).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
