//! Per-frame processing: router -> gate -> histories, router -> readiness.
//!
//! Runs synchronously for each frame, so two frames never interleave.

use std::time::Instant;

use tokio::sync::watch;

use crate::gate::{GateConfig, UpdateGate};
use crate::readiness::ReadinessTracker;
use crate::router::{self, FrameConsumer};
use crate::state::SharedState;
use crate::types::Snapshot;

/// What one frame did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub malformed: bool,
    /// A snapshot was present and accepted by the gate.
    pub accepted: bool,
    /// The scan status should be fetched.
    pub poll: bool,
}

pub struct Pipeline {
    state: SharedState,
    gate_rx: watch::Receiver<GateConfig>,
    gate: UpdateGate,
    readiness: ReadinessTracker,
}

impl Pipeline {
    pub fn new(state: SharedState, gate_rx: watch::Receiver<GateConfig>) -> Self {
        Self {
            state,
            gate_rx,
            gate: UpdateGate::new(),
            readiness: ReadinessTracker::new(),
        }
    }

    pub fn handle_frame(&mut self, text: &str, now: Instant) -> FrameOutcome {
        let mut pass = FramePass {
            pipeline: self,
            now,
            outcome: FrameOutcome::default(),
        };
        if !router::dispatch(text, &mut pass) {
            pass.outcome.malformed = true;
        }
        pass.outcome
    }

    /// Called when a new transport comes up.
    pub fn on_connected(&mut self) {
        self.readiness.reset();
    }

    pub fn readiness(&self) -> &ReadinessTracker {
        &self.readiness
    }

    fn offer_snapshot(&mut self, snapshot: Snapshot, now: Instant) -> bool {
        let config = *self.gate_rx.borrow();
        if !self.gate.apply(now, &config) {
            return false;
        }
        self.state.commit_snapshot(snapshot);
        true
    }

    fn scan_signal(&mut self, ready: bool) -> bool {
        let scanning = self.state.scan_running();
        self.readiness.observe(ready, scanning)
    }
}

struct FramePass<'a> {
    pipeline: &'a mut Pipeline,
    now: Instant,
    outcome: FrameOutcome,
}

impl FrameConsumer for FramePass<'_> {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.outcome.accepted = self.pipeline.offer_snapshot(snapshot, self.now);
    }

    fn on_scan_ready(&mut self, ready: bool) {
        self.outcome.poll = self.pipeline.scan_signal(ready);
    }
}
