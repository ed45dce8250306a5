mod common;
use common::{quiet_logger, tmp_dir, FakeRunner, ENV_LOCK};

use rfid_bridge::app::App;
use rfid_bridge::config::{BridgeConfig, BridgeMode};
use rfid_bridge::errors::BridgeErrorKind;
use rfid_bridge::http::cgi;
use rfid_bridge::services::request::IncomingRequest;
use std::path::PathBuf;

const KEYS: &[&str] = &[
    "RFID_BRIDGE_MODE",
    "RFID_BRIDGE_DIAGNOSTIC",
    "RFID_BRIDGE_PROGRAM",
    "RFID_BRIDGE_WORK_DIR",
    "RFID_BRIDGE_TIMEOUT_MS",
    "RFID_BRIDGE_ACTIONS_FILE",
];

fn snapshot() -> Vec<(&'static str, Option<String>)> {
    KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect()
}

fn restore_env(previous: Vec<(&'static str, Option<String>)>) {
    for (key, value) in previous {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

#[tokio::test]
async fn from_env_reads_bridge_variables() {
    let _guard = ENV_LOCK.lock().await;
    let previous = snapshot();
    for key in KEYS {
        std::env::remove_var(key);
    }

    std::env::set_var("RFID_BRIDGE_MODE", "diagnostic");
    std::env::set_var("RFID_BRIDGE_PROGRAM", "/opt/jdk/bin/java");
    std::env::set_var("RFID_BRIDGE_WORK_DIR", "/srv/rfid");
    std::env::set_var("RFID_BRIDGE_TIMEOUT_MS", "1500");

    let config = BridgeConfig::from_env().expect("config");
    assert_eq!(config.mode, BridgeMode::Diagnostic);
    assert_eq!(config.launcher.program, "/opt/jdk/bin/java");
    assert_eq!(config.work_dir, PathBuf::from("/srv/rfid"));
    assert_eq!(config.timeout_ms, 1500);

    std::env::set_var("RFID_BRIDGE_TIMEOUT_MS", "soon");
    let err = BridgeConfig::from_env().unwrap_err();
    assert_eq!(err.kind(), BridgeErrorKind::Config);

    restore_env(previous);
}

#[tokio::test]
async fn actions_file_replaces_default_registry() {
    let dir = tmp_dir("rfid-bridge-actions");
    let path = dir.join("actions.json");
    std::fs::write(
        &path,
        r#"{ "inventory": [], "write-user": ["offset", "data"] }"#,
    )
    .expect("write actions file");

    let config = BridgeConfig {
        actions_file: Some(path),
        ..BridgeConfig::default()
    };
    let runner = FakeRunner::new(Ok(common::executed("OK", "", 0)));
    let app = App::with_runner(config, quiet_logger(), runner.clone()).expect("app");

    assert_eq!(app.registry.len(), 2);
    let request = IncomingRequest::new(Some("write-user"))
        .with_param("data", "BEEF")
        .with_param("offset", "2");
    let response = app.bridge.handle(&request).await;
    assert!(response.ok);
    let args = &runner.calls()[0].args;
    assert_eq!(args[args.len() - 3..], ["write-user", "2", "BEEF"]);
}

#[tokio::test]
async fn broken_actions_file_fails_initialization() {
    let dir = tmp_dir("rfid-bridge-actions");
    let path = dir.join("actions.json");
    std::fs::write(&path, r#"{ "clear": ["palabras", "palabras"] }"#).expect("write");

    let config = BridgeConfig {
        actions_file: Some(path),
        ..BridgeConfig::default()
    };
    let runner = FakeRunner::new(Ok(common::executed("OK", "", 0)));
    let err = App::with_runner(config, quiet_logger(), runner)
        .err()
        .expect("init must fail");
    assert_eq!(err.kind(), BridgeErrorKind::Config);

    let missing = BridgeConfig {
        actions_file: Some(dir.join("missing.json")),
        ..BridgeConfig::default()
    };
    let runner = FakeRunner::new(Ok(common::executed("OK", "", 0)));
    assert!(App::with_runner(missing, quiet_logger(), runner).is_err());
}

#[tokio::test]
async fn cgi_run_writes_header_and_json() {
    let runner = FakeRunner::new(Ok(common::executed("NO_TAG\n", "", 0)));
    let app = common::app_with(BridgeMode::Clean, runner);
    let env = cgi::CgiEnv {
        method: "GET".to_string(),
        query: "action=inventory".to_string(),
        content_type: None,
        content_length: 0,
    };

    let mut out = Vec::new();
    let response = cgi::run(&app, &env, &b""[..], &mut out).await.expect("cgi");
    assert!(response.ok);

    let text = String::from_utf8(out).expect("utf8");
    let (head, body) = text.split_once("\r\n\r\n").expect("header block");
    assert_eq!(head, "Content-Type: application/json; charset=utf-8");
    let value: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(value["resultado"], "NO_TAG");
}
