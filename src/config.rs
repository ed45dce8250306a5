use crate::constants::{limits, network};
use crate::errors::BridgeError;
use crate::services::command_builder::LauncherConfig;
use crate::services::output_filter::OutputFilter;
use crate::services::registry::ActionRegistry;
use crate::utils::feature_flags::{is_falsy, is_truthy, split_list};
use std::path::PathBuf;
use std::time::Duration;

/// Response configuration. Diagnostic mode discloses the command line and
/// raw streams and must not face untrusted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BridgeMode {
    #[default]
    Clean,
    Diagnostic,
}

impl BridgeMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "clean" => Some(BridgeMode::Clean),
            "diagnostic" | "inspect" | "inspection" | "debug" => Some(BridgeMode::Diagnostic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BridgeMode::Clean => "clean",
            BridgeMode::Diagnostic => "diagnostic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub mode: BridgeMode,
    pub launcher: LauncherConfig,
    pub work_dir: PathBuf,
    /// Zero disables the bound.
    pub timeout_ms: u64,
    pub max_capture_bytes: usize,
    pub actions_file: Option<PathBuf>,
    pub filter: OutputFilter,
    pub listen: String,
}

fn default_work_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, BridgeError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| {
            BridgeError::config(format!(
                "{} must be a non-negative integer, got '{}'",
                key, raw
            ))
        })
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: BridgeMode::default(),
            launcher: LauncherConfig::default(),
            work_dir: default_work_dir(),
            timeout_ms: limits::DEFAULT_TIMEOUT_MS,
            max_capture_bytes: limits::DEFAULT_MAX_CAPTURE_BYTES,
            actions_file: None,
            filter: OutputFilter::default(),
            listen: network::DEFAULT_LISTEN.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from any variable source; unset keys keep defaults.
    pub fn from_vars<F>(var: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("RFID_BRIDGE_MODE") {
            config.mode = BridgeMode::parse(&raw).ok_or_else(|| {
                BridgeError::config(format!(
                    "RFID_BRIDGE_MODE must be clean or diagnostic, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(raw) = get("RFID_BRIDGE_DIAGNOSTIC") {
            if is_truthy(&raw) {
                config.mode = BridgeMode::Diagnostic;
            } else if is_falsy(&raw) {
                config.mode = BridgeMode::Clean;
            }
        }
        if let Some(program) = get("RFID_BRIDGE_PROGRAM") {
            config.launcher.program = program;
        }
        if let Some(flags) = get("RFID_BRIDGE_NATIVE_FLAGS") {
            config.launcher.native_access_flags =
                flags.split_whitespace().map(str::to_string).collect();
        }
        if let Some(path) = get("RFID_BRIDGE_LIBRARY_PATH") {
            config.launcher.library_path = path;
        }
        if let Some(classpath) = get("RFID_BRIDGE_CLASSPATH") {
            config.launcher.classpath = classpath;
        }
        if let Some(entry) = get("RFID_BRIDGE_ENTRY_POINT") {
            config.launcher.entry_point = entry;
        }
        if let Some(dir) = get("RFID_BRIDGE_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("RFID_BRIDGE_TIMEOUT_MS") {
            config.timeout_ms = parse_number("RFID_BRIDGE_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("RFID_BRIDGE_MAX_CAPTURE_BYTES") {
            config.max_capture_bytes = parse_number("RFID_BRIDGE_MAX_CAPTURE_BYTES", &raw)?;
        }
        if let Some(path) = get("RFID_BRIDGE_ACTIONS_FILE") {
            config.actions_file = Some(PathBuf::from(path));
        }
        let sentinels = get("RFID_BRIDGE_SENTINELS").map(|raw| split_list(&raw));
        let prefixes = get("RFID_BRIDGE_PREFIXES").map(|raw| split_list(&raw));
        if sentinels.is_some() || prefixes.is_some() {
            let defaults = OutputFilter::default();
            config.filter = OutputFilter::new(
                sentinels.unwrap_or_else(|| defaults.sentinels().to_vec()),
                prefixes.unwrap_or_else(|| defaults.prefixes().to_vec()),
            );
        }
        if let Some(listen) = get("RFID_BRIDGE_LISTEN") {
            config.listen = listen;
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn registry(&self) -> Result<ActionRegistry, BridgeError> {
        match &self.actions_file {
            Some(path) => ActionRegistry::from_file(path),
            None => Ok(ActionRegistry::for_mode(self.mode)),
        }
    }
}
