//! Entry point for the vpsdash headless follower. Parses args and runs the sync core.

use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vpsdash::config::{Cli, Config};
use vpsdash::prefs::{load_preferences, preferences_path, save_preferences};
use vpsdash::scan::ScanState;
use vpsdash::state::DashboardState;
use vpsdash::Dashboard;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let prefs = load_preferences();
    let config = Config::resolve(&cli, &prefs)?;

    if cli.save {
        let next = config.to_preferences();
        if next != prefs {
            save_preferences(&next)?;
            info!(path = %preferences_path().display(), "preferences saved");
        }
    }

    if cli.dry_run {
        println!("ws_url: {}", config.ws_url);
        println!("api_base: {}", config.api_base);
        println!("reconnect_ms: {}", config.reconnect_delay.as_millis());
        println!("interval_ms: {}", config.gate.min_interval_ms());
        println!("frozen: {}", config.gate.is_frozen());
        println!("scan_path: {}", config.scan_path);
        return Ok(());
    }

    let mut dash = Dashboard::new(&config)?;
    match dash.load_server_info().await {
        Ok(info) => info!(host = %info.hostname, os = %info.os, arch = %info.arch, "server info"),
        Err(e) => warn!(error = %e, "server info unavailable"),
    }

    let reporter = tokio::spawn(report(dash.subscribe()));
    dash.start();
    if let Some(path) = config.initial_scan.clone() {
        dash.spawn_scan(path);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed");
    }
    info!("shutting down");
    dash.stop().await;
    reporter.abort();
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// One line per accepted snapshot, plus connectivity and scan transitions.
async fn report(mut rx: watch::Receiver<DashboardState>) {
    let mut last = rx.borrow().clone();
    while rx.changed().await.is_ok() {
        let cur = rx.borrow_and_update().clone();
        if cur.connected != last.connected {
            if cur.connected {
                info!("backend connected");
            } else {
                warn!("backend connection lost; retrying");
            }
        }
        if !cur.history.cpu.same_version(&last.history.cpu) {
            let h = &cur.history;
            info!(
                cpu = %format!("{:.1}%", h.cpu.latest().unwrap_or(0.0)),
                cpu_peak = %format!("{:.1}%", h.cpu.peak()),
                mem = %format!("{:.1}%", h.memory.latest().unwrap_or(0.0)),
                swap = %format!("{:.1}%", h.swap.latest().unwrap_or(0.0)),
                rx = %format_bps(h.net.first.latest().unwrap_or(0.0)),
                tx = %format_bps(h.net.second.latest().unwrap_or(0.0)),
                "update"
            );
        }
        if cur.scan.state != last.scan.state {
            match cur.scan.state {
                ScanState::Running => info!(path = %cur.scan.path, "scan running"),
                ScanState::Done => {
                    let total = cur.scan.result.as_ref().map(|r| r.total_size).unwrap_or(0);
                    info!(path = %cur.scan.path, total_bytes = total, "scan done");
                }
                ScanState::Error => warn!(
                    path = %cur.scan.path,
                    error = cur.scan.error.as_deref().unwrap_or("unknown"),
                    "scan failed"
                ),
                ScanState::Idle => info!("scan idle"),
            }
        }
        last = cur;
    }
}

fn format_bps(v: f64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];
    let mut v = v.max(0.0);
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    format!("{v:.1} {}", UNITS[unit])
}
