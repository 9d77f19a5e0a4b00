//! Connection manager: keeps one WebSocket to the backend alive and feeds every
//! frame through the pipeline.
//!
//! The whole session (transport, reconnect timer, in-flight status polls) lives
//! in a single task. `stop()` aborts that task and waits for it, so nothing it
//! owned can touch shared state afterwards.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::pipeline::Pipeline;
use crate::scan::ScanController;
use crate::state::SharedState;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub reconnect_delay: Duration,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

pub struct ConnectionManager {
    settings: ConnectionSettings,
    pipeline: Arc<Mutex<Pipeline>>,
    scan: ScanController,
    state: SharedState,
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn new(
        settings: ConnectionSettings,
        pipeline: Pipeline,
        scan: ScanController,
        state: SharedState,
    ) -> Self {
        Self {
            settings,
            pipeline: Arc::new(Mutex::new(pipeline)),
            scan,
            state,
            task: None,
        }
    }

    /// Begin connecting. Any previous session is aborted, and the new one
    /// waits for it to finish before touching shared state.
    pub fn start(&mut self) {
        let previous = self.task.take();
        if let Some(old) = &previous {
            old.abort();
        }
        let session = Session {
            settings: self.settings.clone(),
            pipeline: self.pipeline.clone(),
            scan: self.scan.clone(),
            state: self.state.clone(),
            polls: JoinSet::new(),
        };
        self.task = Some(tokio::spawn(session.run(previous)));
    }

    /// Tear down the session: cancels the pending reconnect, closes the
    /// transport and drops in-flight polls before returning.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        self.state.set_connected(false);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Session {
    settings: ConnectionSettings,
    pipeline: Arc<Mutex<Pipeline>>,
    scan: ScanController,
    state: SharedState,
    // status polls triggered by readiness edges; aborted with the session
    polls: JoinSet<()>,
}

impl Session {
    async fn run(mut self, previous: Option<JoinHandle<()>>) {
        if let Some(old) = previous {
            let _ = old.await;
        }
        loop {
            match connect_async(self.settings.url.as_str()).await {
                Ok((ws, _)) => {
                    info!(url = %self.settings.url, "connected");
                    self.state.set_connected(true);
                    self.lock_pipeline().on_connected();
                    self.serve(ws).await;
                    info!(url = %self.settings.url, "disconnected");
                }
                Err(e) => {
                    warn!(url = %self.settings.url, error = %e, "connect failed");
                }
            }
            self.state.set_connected(false);
            debug!(
                delay_ms = self.settings.reconnect_delay.as_millis() as u64,
                "scheduling reconnect"
            );
            self.wait_reconnect().await;
        }
    }

    // Reads until the transport closes. Errors force a close so that the
    // caller's single reconnect path handles both cases.
    async fn serve(&mut self, mut ws: WsStream) {
        loop {
            tokio::select! {
                msg = ws.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.on_frame(&text),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => self.on_frame(text),
                        Err(e) => warn!(error = %e, "dropping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error; closing");
                        let _ = ws.close(None).await;
                        break;
                    }
                },
                Some(_) = self.polls.join_next(), if !self.polls.is_empty() => {}
            }
        }
    }

    async fn wait_reconnect(&mut self) {
        let timer = sleep(self.settings.reconnect_delay);
        tokio::pin!(timer);
        loop {
            tokio::select! {
                _ = &mut timer => return,
                Some(_) = self.polls.join_next(), if !self.polls.is_empty() => {}
            }
        }
    }

    fn on_frame(&mut self, text: &str) {
        let outcome = self.lock_pipeline().handle_frame(text, Instant::now());
        if outcome.poll {
            let scan = self.scan.clone();
            self.polls.spawn(async move {
                if let Err(e) = scan.poll().await {
                    warn!(error = %e, "scan status poll failed");
                }
            });
        }
    }

    fn lock_pipeline(&self) -> std::sync::MutexGuard<'_, Pipeline> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
