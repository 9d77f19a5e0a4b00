//! Wires the sync core together: connection, pipeline, gate, scan controller and
//! the shared state readers subscribe to.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Config;
use crate::control::ControlClient;
use crate::error::Result;
use crate::gate::{clamp_interval_ms, GateHandle};
use crate::pipeline::Pipeline;
use crate::scan::ScanController;
use crate::state::{DashboardState, SharedState};
use crate::types::ServerInfo;
use crate::ws::{ConnectionManager, ConnectionSettings};

pub struct Dashboard {
    state: SharedState,
    gate: GateHandle,
    scan: ScanController,
    control: ControlClient,
    connection: ConnectionManager,
    interval_pinned: bool,
}

impl Dashboard {
    pub fn new(config: &Config) -> Result<Self> {
        let state = SharedState::new();
        let gate = GateHandle::new(config.gate);
        let control = ControlClient::new(config.api_base.clone())?;
        let scan = ScanController::new(control.clone(), state.clone());
        let pipeline = Pipeline::new(state.clone(), gate.subscribe());
        let settings = ConnectionSettings {
            reconnect_delay: config.reconnect_delay,
            ..ConnectionSettings::new(config.ws_url.as_str())
        };
        let connection = ConnectionManager::new(settings, pipeline, scan.clone(), state.clone());
        if let Some(secs) = config.cache_ttl_secs {
            state.set_scan_cache_ttl(Duration::from_secs(secs));
        }
        Ok(Self {
            state,
            gate,
            scan,
            control,
            connection,
            interval_pinned: config.interval_pinned,
        })
    }

    /// Fetch `/api/info` and adopt its hints. The interval hint only applies
    /// when the user has not chosen one.
    pub async fn load_server_info(&self) -> Result<ServerInfo> {
        let info = self.control.server_info().await?;
        if let Some(ms) = info.interval_ms.filter(|_| !self.interval_pinned) {
            let ms = clamp_interval_ms(ms);
            info!(interval_ms = ms, "using server update interval");
            self.gate.set_min_interval_ms(ms);
        }
        self.state.set_server_info(info.clone());
        Ok(info)
    }

    pub fn start(&mut self) {
        self.connection.start();
    }

    pub async fn stop(&mut self) {
        self.connection.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.connection.is_running()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn gate(&self) -> &GateHandle {
        &self.gate
    }

    pub fn scan(&self) -> &ScanController {
        &self.scan
    }

    /// Start a scan in the background; failures are logged and the session
    /// reverts to idle.
    pub fn spawn_scan(&self, path: String) -> tokio::task::JoinHandle<()> {
        let scan = self.scan.clone();
        tokio::spawn(async move {
            if let Err(e) = scan.start(&path).await {
                warn!(path = %path, error = %e, "scan could not be started");
            }
        })
    }
}
