//! Shared helpers: a throwaway push backend and state waiters.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use vpsdash::state::DashboardState;

pub struct Backend {
    pub url: String,
    accepted: Arc<AtomicUsize>,
}

impl Backend {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
enum Ending {
    HoldOpen,
    Close,
    // drop the TCP stream without a closing handshake
    Reset,
}

/// Accepts WebSocket clients, sends `frames` to each, then either keeps the
/// socket open until the client leaves or closes it right away.
pub async fn spawn_backend(frames: Vec<String>, hold_open: bool) -> Backend {
    let ending = if hold_open { Ending::HoldOpen } else { Ending::Close };
    serve(frames, ending).await
}

/// Like `spawn_backend`, but each connection is torn down abruptly so the
/// client sees a transport error instead of a close frame.
pub async fn spawn_resetting_backend(frames: Vec<String>) -> Backend {
    serve(frames, Ending::Reset).await
}

async fn serve(frames: Vec<String>, ending: Ending) -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                for f in frames {
                    if ws.send(Message::Text(f)).await.is_err() {
                        return;
                    }
                }
                match ending {
                    Ending::HoldOpen => {
                        while let Some(Ok(_)) = ws.next().await {}
                    }
                    Ending::Close => {
                        let _ = ws.close(None).await;
                    }
                    Ending::Reset => drop(ws),
                }
            });
        }
    });
    Backend {
        url: format!("ws://{addr}/ws"),
        accepted,
    }
}

/// Wait (up to 5s) until `pred` holds for the shared state.
pub async fn wait_until(
    rx: &mut watch::Receiver<DashboardState>,
    pred: impl Fn(&DashboardState) -> bool,
) -> bool {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .is_ok()
}

/// Poll `f` every 10ms (up to 5s) until it returns true.
pub async fn eventually(f: impl Fn() -> bool) -> bool {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !f() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}

pub fn snapshot_frame(cpu: f64, ready: Option<bool>) -> String {
    let mut frame = serde_json::json!({
        "type": "metrics",
        "snapshot": {
            "timestamp": "2024-05-01T12:00:00Z",
            "cpu": { "total_percent": cpu, "per_core": [cpu, cpu], "model_name": "Test CPU", "freq_mhz": 2400.0 },
            "memory": { "percent": 50.0, "used_bytes": 1024, "total_bytes": 2048 },
            "swap": { "percent": 1.5 },
            "disks": [],
            "disk_io": [{ "device": "sda", "read_bps": 100.0, "write_bps": 50.0 }],
            "network": [
                { "interface": "eth0", "recv_bps": 1000.0, "sent_bps": 10.0 },
                { "interface": "eth1", "recv_bps": 24.0, "sent_bps": 5.0 }
            ]
        }
    });
    if let Some(r) = ready {
        frame["ncdu_ready"] = serde_json::Value::Bool(r);
    }
    frame.to_string()
}
