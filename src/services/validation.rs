use crate::errors::BridgeError;
use crate::services::registry::ActionRegistry;
use crate::services::request::IncomingRequest;
use std::sync::Arc;

/// An action whose required parameters were all supplied, values in
/// registry order. Only `Validation::validate` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCommand {
    action: String,
    values: Vec<String>,
}

impl ValidatedCommand {
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone)]
pub struct Validation {
    registry: Arc<ActionRegistry>,
}

impl Validation {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn validate(&self, request: &IncomingRequest) -> Result<ValidatedCommand, BridgeError> {
        let action = request
            .action
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or(BridgeError::MissingAction)?;

        let spec = self
            .registry
            .lookup(action)
            .ok_or_else(|| BridgeError::UnknownAction {
                action: action.to_string(),
            })?;

        let mut values = Vec::with_capacity(spec.params.len());
        for name in &spec.params {
            let value = request
                .param(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BridgeError::MissingParameter {
                    action: action.to_string(),
                    name: name.clone(),
                })?;
            if value.contains('\0') {
                return Err(BridgeError::InvalidParameter {
                    action: action.to_string(),
                    name: name.clone(),
                });
            }
            values.push(value.to_string());
        }

        Ok(ValidatedCommand {
            action: spec.name.clone(),
            values,
        })
    }
}
