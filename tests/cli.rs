//! End-to-end checks of the binary that need no network.

use std::path::Path;
use std::process::{Command, Output};

fn snipstr(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snipstr"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("SNIPSTR_NSEC")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run snipstr")
}

#[test]
fn relays_reports_config_as_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        r#"
relays = ["wss://one.example/", "wss://ONE.example"]
search_relays = ["wss://search.example"]
index_relays = []
"#,
    )
    .unwrap();

    let out = snipstr(&config, &["--json", "relays"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["relays"], serde_json::json!(["wss://one.example"]));
    assert_eq!(report["search_relays"], serde_json::json!(["wss://search.example"]));
    assert_eq!(report["index_relays"], serde_json::json!([]));
    assert!(report.get("probed").is_none());
}

#[test]
fn search_without_relays_fails_fast() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "relays = []\nsearch_relays = []\nindex_relays = []\n").unwrap();

    let out = snipstr(&config, &["search", "hook"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no search relays available"), "stderr: {stderr}");
}

#[test]
fn invalid_relay_in_config_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "relays = [\"https://not-a-relay.example\"]\n").unwrap();

    let out = snipstr(&config, &["relays"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Configuration validation failed"), "stderr: {stderr}");
}

#[test]
fn publish_without_signer_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    let file = dir.path().join("hello.rs");
    std::fs::write(&file, "fn main() {}").unwrap();

    let out = snipstr(&config, &["publish", file.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("needs a signer"), "stderr: {stderr}");
}
