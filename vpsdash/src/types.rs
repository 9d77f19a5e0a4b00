//! Types that mirror the backend's JSON schema (push frames and control API replies).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// Go encodes nil slices as `null`.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CpuMetrics {
    pub total_percent: f64,
    pub freq_mhz: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub per_core: Vec<f64>,
    pub core_count: u32,
    pub model_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MemMetrics {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub cached: u64,
    pub buffers: u64,
    pub percent: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SwapMetrics {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DiskMetrics {
    pub mountpoint: String,
    pub device: String,
    pub fstype: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DiskIoMetrics {
    pub device: String,
    pub read_bps: f64,
    pub write_bps: f64,
    pub read_ops: f64,
    pub write_ops: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NetMetrics {
    pub interface: String,
    // per-second rates computed by the backend
    pub recv_bps: f64,
    pub sent_bps: f64,
    pub total_recv: u64,
    pub total_sent: u64,
}

/// One point-in-time measurement pushed by the backend each tick.
///
/// Missing sections decode to their zero value, so a partial snapshot still
/// feeds every history series.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub cpu: CpuMetrics,
    pub memory: MemMetrics,
    pub swap: SwapMetrics,
    #[serde(deserialize_with = "null_as_default")]
    pub disks: Vec<DiskMetrics>,
    #[serde(deserialize_with = "null_as_default")]
    pub disk_io: Vec<DiskIoMetrics>,
    #[serde(deserialize_with = "null_as_default")]
    pub network: Vec<NetMetrics>,
}

impl Snapshot {
    /// Receive/send rates summed across every interface in this snapshot.
    pub fn net_totals(&self) -> (f64, f64) {
        let rx = self.network.iter().map(|n| n.recv_bps).sum();
        let tx = self.network.iter().map(|n| n.sent_bps).sum();
        (rx, tx)
    }

    /// Read/write rates summed across every block device in this snapshot.
    pub fn disk_io_totals(&self) -> (f64, f64) {
        let rd = self.disk_io.iter().map(|d| d.read_bps).sum();
        let wr = self.disk_io.iter().map(|d| d.write_bps).sum();
        (rd, wr)
    }
}

/// Inbound push frame. An absent field means "nothing new on that channel".
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub snapshot: Option<Snapshot>,
    pub ncdu_ready: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ServerInfo {
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub uptime: String,
    pub version: Option<String>,
    pub interval_ms: Option<u64>,
    pub ncdu_cache_ttl_sec: Option<u64>,
    // older backends reported the TTL in milliseconds
    pub ncdu_cache_ttl_ms: Option<u64>,
}

impl ServerInfo {
    /// Scan cache TTL in whole seconds, preferring the seconds field.
    pub fn cache_ttl_secs(&self) -> Option<u64> {
        match (self.ncdu_cache_ttl_sec, self.ncdu_cache_ttl_ms) {
            (Some(sec), _) if sec > 0 => Some(sec),
            (_, Some(ms)) if ms > 0 => Some(((ms + 500) / 1000).max(1)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Idle,
    Running,
    Done,
    Error,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DirEntry {
    pub name: String,
    #[serde(default)]
    pub asize: i64,
    #[serde(default)]
    pub dsize: i64,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<DirEntry>,
}

/// Reply of `GET /api/ncdu/status`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScanResult {
    pub path: String,
    pub scanned_at: Option<DateTime<Utc>>,
    pub total_size: i64,
    pub root: Option<DirEntry>,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How the backend handled a start request.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    Started,
    Running,
    Cached,
    #[serde(other)]
    Unknown,
}

impl StartMode {
    /// The result may already be available, so fetch status right away.
    pub fn wants_immediate_poll(self) -> bool {
        matches!(self, StartMode::Cached | StartMode::Running)
    }
}

/// Reply of `POST /api/ncdu/scan`.
#[derive(Debug, Deserialize, Clone)]
pub struct StartScanReply {
    pub status: StartMode,
    #[serde(default)]
    pub path: Option<String>,
}

/// Reply of `GET`/`PUT /api/ncdu/cache`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CacheTtlReply {
    pub cache_ttl_sec: u64,
    #[serde(default)]
    pub cache_ttl: Option<String>,
}
