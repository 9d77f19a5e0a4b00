//! Tests for preferences load/save and normalization.
use std::fs;
use std::sync::Mutex;

use vpsdash::prefs::{load_preferences, preferences_path, save_preferences, Preferences};

// Global lock to serialize tests that mutate process-wide environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn isolated() -> tempfile::TempDir {
    let td = tempfile::tempdir().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", td.path());
    td
}

#[test]
fn missing_file_yields_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let _td = isolated();
    assert_eq!(load_preferences(), Preferences::default());
}

#[test]
fn save_then_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    let _td = isolated();
    let p = Preferences {
        is_frozen: true,
        update_interval_ms: Some(1500),
        default_scan_path: "/srv".into(),
        ncdu_cache_ttl_sec: Some(120),
        ncdu_cache_ttl_ms: None,
    };
    save_preferences(&p).unwrap();
    assert!(preferences_path().exists());
    assert_eq!(load_preferences(), p);
}

#[test]
fn load_clamps_and_migrates_legacy_ttl() {
    let _guard = ENV_LOCK.lock().unwrap();
    let _td = isolated();
    let path = preferences_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{"update_interval_ms": 10, "ncdu_cache_ttl_ms": 90000, "default_scan_path": ""}"#,
    )
    .unwrap();
    let p = load_preferences();
    assert_eq!(p.update_interval_ms, Some(250));
    assert_eq!(p.ncdu_cache_ttl_sec, Some(90));
    assert_eq!(p.ncdu_cache_ttl_ms, None);
    assert_eq!(p.default_scan_path, "/");
    assert!(!p.is_frozen);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let _td = isolated();
    let path = preferences_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ definitely not json").unwrap();
    assert_eq!(load_preferences(), Preferences::default());
}
