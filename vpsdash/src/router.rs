//! Decodes inbound push frames and hands each present field to its consumer.

use tracing::{debug, warn};

use crate::types::{PushFrame, Snapshot};

/// Frame type carrying metrics. Frames without a type are treated the same.
pub const METRICS_FRAME: &str = "metrics";

pub trait FrameConsumer {
    fn on_snapshot(&mut self, snapshot: Snapshot);
    fn on_scan_ready(&mut self, ready: bool);
}

/// Parse a frame; malformed input is logged and dropped.
pub fn decode(text: &str) -> Option<PushFrame> {
    match serde_json::from_str::<PushFrame>(text) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(error = %e, len = text.len(), "dropping malformed push frame");
            None
        }
    }
}

/// Decode `text` and dispatch. Returns false if the frame was malformed.
pub fn dispatch<C: FrameConsumer + ?Sized>(text: &str, consumer: &mut C) -> bool {
    let Some(frame) = decode(text) else {
        return false;
    };
    route(frame, consumer);
    true
}

pub fn route<C: FrameConsumer + ?Sized>(frame: PushFrame, consumer: &mut C) {
    if let Some(snapshot) = frame.snapshot {
        match frame.kind.as_deref() {
            None | Some(METRICS_FRAME) => consumer.on_snapshot(snapshot),
            Some(other) => debug!(kind = other, "ignoring snapshot in non-metrics frame"),
        }
    }
    if let Some(ready) = frame.ncdu_ready {
        consumer.on_scan_ready(ready);
    }
}
