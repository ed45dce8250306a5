use crate::config::BridgeMode;
use crate::errors::{BridgeError, BridgeErrorKind};
use crate::services::command_builder::Invocation;
use crate::services::output_filter::OutputFilter;
use crate::services::process::ExecutionResult;
use serde::Serialize;

/// The single JSON document returned per request. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resultado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comando: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl BridgeResponse {
    /// Pretty JSON; non-ASCII text is written as-is, control characters escaped.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| r#"{"ok": false, "error": "serialization failed"}"#.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    mode: BridgeMode,
    filter: OutputFilter,
}

impl ResponseFormatter {
    pub fn new(mode: BridgeMode, filter: OutputFilter) -> Self {
        Self { mode, filter }
    }

    /// `accion` is echoed once the action is known to be registered, and for
    /// unknown actions so the caller sees what was refused.
    pub fn error(
        &self,
        action: Option<&str>,
        invocation: Option<&Invocation>,
        err: &BridgeError,
    ) -> BridgeResponse {
        let echo = match err.kind() {
            BridgeErrorKind::MissingAction
            | BridgeErrorKind::MissingParameter
            | BridgeErrorKind::InvalidParameter
            | BridgeErrorKind::MalformedRequest => false,
            BridgeErrorKind::UnknownAction
            | BridgeErrorKind::LaunchFailure
            | BridgeErrorKind::Timeout
            | BridgeErrorKind::Config => true,
        };
        let comando = match self.mode {
            BridgeMode::Diagnostic => invocation.map(Invocation::display),
            BridgeMode::Clean => None,
        };
        BridgeResponse {
            ok: false,
            accion: if echo { action.map(str::to_string) } else { None },
            error: Some(err.to_string()),
            comando,
            ..Default::default()
        }
    }

    pub fn result(
        &self,
        action: &str,
        invocation: &Invocation,
        result: &ExecutionResult,
    ) -> BridgeResponse {
        match self.mode {
            BridgeMode::Clean => BridgeResponse {
                ok: result.success(),
                accion: Some(action.to_string()),
                resultado: Some(self.filter.apply(&result.stdout)),
                exit_code: (!result.success()).then_some(result.exit_code),
                ..Default::default()
            },
            BridgeMode::Diagnostic => BridgeResponse {
                ok: result.success(),
                accion: Some(action.to_string()),
                comando: Some(invocation.display()),
                stdout: Some(result.stdout.trim().to_string()),
                stderr: Some(result.stderr.trim().to_string()),
                exit_code: Some(result.exit_code),
                duration_ms: Some(result.duration_ms),
                ..Default::default()
            },
        }
    }
}
