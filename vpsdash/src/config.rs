//! Runtime configuration: command line merged over stored preferences.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use url::Url;

use crate::gate::{GateConfig, DEFAULT_INTERVAL_MS};
use crate::prefs::Preferences;
use crate::ws::DEFAULT_RECONNECT_DELAY;

#[derive(Debug, Parser)]
#[command(
    name = "vpsdash",
    version,
    about = "Follow a VPS dashboard backend: live metrics, rolling history, scan status"
)]
pub struct Cli {
    /// Backend push socket, e.g. ws://HOST:PORT/ws
    pub url: String,

    /// HTTP API base (default: derived from the socket URL)
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// Minimum milliseconds between applied updates (>= 250)
    #[arg(long, short = 'i', value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Start paused: keep the connection but apply no updates
    #[arg(long)]
    pub frozen: bool,

    /// Delay before reconnecting after the socket drops
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_RECONNECT_DELAY.as_millis() as u64)]
    pub reconnect_ms: u64,

    /// Start a directory scan of PATH once connected
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    pub scan: Option<String>,

    /// Persist interval / frozen / scan path to the preferences file
    #[arg(long)]
    pub save: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ws_url: Url,
    pub api_base: Url,
    pub reconnect_delay: Duration,
    pub gate: GateConfig,
    /// The interval came from the user, so server hints must not override it.
    pub interval_pinned: bool,
    pub scan_path: String,
    /// Scan to start right after connecting.
    pub initial_scan: Option<String>,
    pub cache_ttl_secs: Option<u64>,
}

impl Config {
    /// Defaults for `ws_url`; everything else as if no flags or preferences were given.
    pub fn new(ws_url: &str) -> anyhow::Result<Self> {
        let ws_url = parse_ws_url(ws_url)?;
        let api_base = api_base_from_ws(&ws_url)?;
        Ok(Self {
            ws_url,
            api_base,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            gate: GateConfig::default(),
            interval_pinned: false,
            scan_path: "/".to_string(),
            initial_scan: None,
            cache_ttl_secs: None,
        })
    }

    pub fn resolve(cli: &Cli, prefs: &Preferences) -> anyhow::Result<Self> {
        let mut cfg = Self::new(&cli.url)?;
        if let Some(api) = cli.api.as_deref() {
            let mut base = Url::parse(api).with_context(|| format!("invalid --api URL {api}"))?;
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            cfg.api_base = base;
        }

        let interval = cli.interval_ms.or(prefs.update_interval_ms);
        cfg.interval_pinned = interval.is_some();
        cfg.gate = GateConfig::new(
            cli.frozen || prefs.is_frozen,
            interval.unwrap_or(DEFAULT_INTERVAL_MS),
        );
        cfg.reconnect_delay = Duration::from_millis(cli.reconnect_ms.max(1));
        cfg.scan_path = prefs.default_scan_path.clone();
        cfg.initial_scan = cli.scan.as_ref().map(|p| {
            if p.trim().is_empty() {
                cfg.scan_path.clone()
            } else {
                p.clone()
            }
        });
        cfg.cache_ttl_secs = prefs.ncdu_cache_ttl_sec;
        Ok(cfg)
    }

    /// Preferences reflecting this configuration (for `--save`).
    pub fn to_preferences(&self) -> Preferences {
        Preferences {
            is_frozen: self.gate.is_frozen(),
            update_interval_ms: self
                .interval_pinned
                .then(|| self.gate.min_interval_ms()),
            default_scan_path: self
                .initial_scan
                .clone()
                .unwrap_or_else(|| self.scan_path.clone()),
            ncdu_cache_ttl_sec: self.cache_ttl_secs,
            ncdu_cache_ttl_ms: None,
        }
    }
}

fn parse_ws_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid URL {raw}"))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => bail!("unsupported scheme {other:?} (expected ws:// or wss://)"),
    }
}

/// `ws://host:port/ws` -> `http://host:port/`, `wss` -> `https`.
pub fn api_base_from_ws(ws: &Url) -> anyhow::Result<Url> {
    let scheme = match ws.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => bail!("cannot derive an API URL from scheme {other:?}"),
    };
    let mut base = ws.clone();
    if base.set_scheme(scheme).is_err() {
        bail!("cannot derive an API URL from {ws}");
    }
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}
