use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeErrorKind {
    MissingAction,
    UnknownAction,
    MissingParameter,
    InvalidParameter,
    MalformedRequest,
    LaunchFailure,
    Timeout,
    Config,
}

/// Every failure that ends a request before a process result exists.
///
/// Display strings are the caller-facing `error` messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Parametro 'accion' requerido")]
    MissingAction,

    #[error("Accion no permitida")]
    UnknownAction { action: String },

    #[error("Falta parametro '{name}'")]
    MissingParameter { action: String, name: String },

    #[error("Parametro '{name}' contiene bytes nulos")]
    InvalidParameter { action: String, name: String },

    #[error("Solicitud malformada: {0}")]
    MalformedRequest(String),

    #[error("No se pudo ejecutar {program}: {reason}")]
    LaunchFailure { program: String, reason: String },

    #[error("Tiempo de espera agotado tras {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Configuracion invalida: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn launch_failure(program: impl Into<String>, reason: impl ToString) -> Self {
        Self::LaunchFailure {
            program: program.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> BridgeErrorKind {
        match self {
            Self::MissingAction => BridgeErrorKind::MissingAction,
            Self::UnknownAction { .. } => BridgeErrorKind::UnknownAction,
            Self::MissingParameter { .. } => BridgeErrorKind::MissingParameter,
            Self::InvalidParameter { .. } => BridgeErrorKind::InvalidParameter,
            Self::MalformedRequest(_) => BridgeErrorKind::MalformedRequest,
            Self::LaunchFailure { .. } => BridgeErrorKind::LaunchFailure,
            Self::Timeout { .. } => BridgeErrorKind::Timeout,
            Self::Config(_) => BridgeErrorKind::Config,
        }
    }
}
