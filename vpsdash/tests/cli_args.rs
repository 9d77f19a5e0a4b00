//! CLI tests for the vpsdash binary (no network: --help / --dry-run only).
use std::fs;

use assert_cmd::Command;

fn run(args: &[&str], config_home: &std::path::Path) -> (bool, String) {
    let output = Command::cargo_bin("vpsdash")
        .unwrap()
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run vpsdash");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

#[test]
fn test_help_mentions_flags() {
    let td = tempfile::tempdir().unwrap();
    let (ok, text) = run(&["--help"], td.path());
    assert!(ok);
    for flag in ["--interval-ms", "--frozen", "--reconnect-ms", "--scan", "--dry-run", "--api"] {
        assert!(text.contains(flag), "help text missing {flag}\n{text}");
    }
}

#[test]
fn test_dry_run_derives_api_base_and_clamps_interval() {
    let td = tempfile::tempdir().unwrap();
    let (ok, text) = run(&["wss://dash.example:8443/ws", "-i", "100", "--dry-run"], td.path());
    assert!(ok, "{text}");
    assert!(text.contains("api_base: https://dash.example:8443/"), "{text}");
    assert!(text.contains("interval_ms: 250"), "{text}");
    assert!(text.contains("frozen: false"), "{text}");
}

#[test]
fn test_rejects_http_url() {
    let td = tempfile::tempdir().unwrap();
    let (ok, text) = run(&["http://host/ws", "--dry-run"], td.path());
    assert!(!ok);
    assert!(text.contains("ws://"), "{text}");
}

#[test]
fn test_save_persists_preferences() {
    let td = tempfile::tempdir().unwrap();
    let (ok, text) = run(
        &["ws://h:1/ws", "--frozen", "-i", "900", "--scan", "/data", "--save", "--dry-run"],
        td.path(),
    );
    assert!(ok, "{text}");
    let data = fs::read_to_string(td.path().join("vpsdash").join("preferences.json"))
        .expect("preferences.json created");
    assert!(data.contains("\"is_frozen\": true"), "{data}");
    assert!(data.contains("900"), "{data}");
    assert!(data.contains("/data"), "{data}");

    // a later run picks the saved values up
    let (ok, text) = run(&["ws://h:1/ws", "--dry-run"], td.path());
    assert!(ok);
    assert!(text.contains("interval_ms: 900"), "{text}");
    assert!(text.contains("frozen: true"), "{text}");
    assert!(text.contains("scan_path: /data"), "{text}");
}
