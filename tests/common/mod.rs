#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rfid_bridge::app::App;
use rfid_bridge::config::{BridgeConfig, BridgeMode};
use rfid_bridge::errors::BridgeError;
use rfid_bridge::services::command_builder::Invocation;
use rfid_bridge::services::logger::{LogLevel, Logger};
use rfid_bridge::services::process::{ExecutionResult, ProcessRunner};
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn tmp_dir(prefix: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create tmp dir");
    dir
}

pub fn quiet_logger() -> Logger {
    Logger::new("test").with_level(LogLevel::Error)
}

pub fn executed(stdout: &str, stderr: &str, exit_code: i32) -> ExecutionResult {
    ExecutionResult {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        exit_code,
        duration_ms: 5,
        stdout_truncated: false,
        stderr_truncated: false,
    }
}

/// Records every invocation and answers with a canned outcome.
pub struct FakeRunner {
    outcome: Result<ExecutionResult, BridgeError>,
    calls: std::sync::Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new(outcome: Result<ExecutionResult, BridgeError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, BridgeError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        self.outcome.clone()
    }
}

pub fn config(mode: BridgeMode) -> BridgeConfig {
    BridgeConfig {
        mode,
        work_dir: std::env::temp_dir(),
        ..BridgeConfig::default()
    }
}

pub fn app_with(mode: BridgeMode, runner: Arc<FakeRunner>) -> App {
    App::with_runner(config(mode), quiet_logger(), runner).expect("app")
}
