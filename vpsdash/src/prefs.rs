//! User preferences: a small JSON file seeding the gate and scan defaults.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/vpsdash/preferences.json (fallback ~/.config/vpsdash/preferences.json)

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::gate::clamp_interval_ms;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval_ms: Option<u64>,
    #[serde(default = "default_scan_path")]
    pub default_scan_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncdu_cache_ttl_sec: Option<u64>,
    // legacy key, folded into ncdu_cache_ttl_sec on load
    #[serde(default, skip_serializing)]
    pub ncdu_cache_ttl_ms: Option<u64>,
}

fn default_scan_path() -> String {
    "/".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            is_frozen: false,
            update_interval_ms: None,
            default_scan_path: default_scan_path(),
            ncdu_cache_ttl_sec: None,
            ncdu_cache_ttl_ms: None,
        }
    }
}

impl Preferences {
    /// Apply the lower bounds and migrate legacy fields.
    pub fn normalized(mut self) -> Self {
        self.update_interval_ms = self.update_interval_ms.map(clamp_interval_ms);
        self.ncdu_cache_ttl_sec = match (self.ncdu_cache_ttl_sec, self.ncdu_cache_ttl_ms) {
            (Some(sec), _) if sec > 0 => Some(sec),
            (_, Some(ms)) if ms > 0 => Some(((ms + 500) / 1000).max(1)),
            _ => None,
        };
        self.ncdu_cache_ttl_ms = None;
        if self.default_scan_path.trim().is_empty() {
            self.default_scan_path = default_scan_path();
        }
        self
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("vpsdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vpsdash")
    }
}

pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}

pub fn load_preferences() -> Preferences {
    let path = preferences_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str::<Preferences>(&s)
            .unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
                Preferences::default()
            })
            .normalized(),
        Err(_) => Preferences::default(),
    }
}

pub fn save_preferences(p: &Preferences) -> std::io::Result<()> {
    let path = preferences_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)
}
