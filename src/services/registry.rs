use crate::config::BridgeMode;
use crate::errors::BridgeError;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// An action and the parameters it requires, in the positional order the
/// external program expects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub params: Vec<String>,
}

impl ActionSpec {
    fn new(name: &str, params: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

const DIAGNOSTIC_ACTIONS: &[(&str, &[&str])] = &[
    ("inventory", &[]),
    ("scan", &[]),
    ("read-epc", &[]),
    ("write-epc", &["epc"]),
    ("clear", &["palabras"]),
    ("clear-filter", &[]),
    ("set-power", &["nivel"]),
    ("get-freq", &[]),
    ("set-freq", &["modo"]),
];

const CLEAN_ACTIONS: &[(&str, &[&str])] = &[
    ("inventory", &[]),
    ("read-epc", &[]),
    ("write-epc", &["epc"]),
    ("clear", &["palabras"]),
    ("clear-filter", &[]),
    ("set-power", &["nivel"]),
];

/// Immutable action table, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRegistry {
    actions: Vec<ActionSpec>,
}

impl ActionRegistry {
    pub fn new(actions: Vec<ActionSpec>) -> Result<Self, BridgeError> {
        let mut seen = HashSet::new();
        for spec in &actions {
            if spec.name.trim().is_empty() {
                return Err(BridgeError::config("action names must be non-empty"));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(BridgeError::config(format!(
                    "action '{}' is declared twice",
                    spec.name
                )));
            }
            let mut params = HashSet::new();
            for param in &spec.params {
                if param.trim().is_empty() {
                    return Err(BridgeError::config(format!(
                        "action '{}' has an empty parameter name",
                        spec.name
                    )));
                }
                if !params.insert(param.as_str()) {
                    return Err(BridgeError::config(format!(
                        "action '{}' repeats parameter '{}'",
                        spec.name, param
                    )));
                }
            }
        }
        Ok(Self { actions })
    }

    fn from_table(table: &[(&str, &[&str])]) -> Self {
        Self {
            actions: table
                .iter()
                .map(|(name, params)| ActionSpec::new(name, params))
                .collect(),
        }
    }

    pub fn for_mode(mode: BridgeMode) -> Self {
        match mode {
            BridgeMode::Clean => Self::from_table(CLEAN_ACTIONS),
            BridgeMode::Diagnostic => Self::from_table(DIAGNOSTIC_ACTIONS),
        }
    }

    /// Parses `{ "action": ["param", ...], ... }`.
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| BridgeError::config(format!("actions file is not JSON: {}", err)))?;
        let obj = value
            .as_object()
            .ok_or_else(|| BridgeError::config("actions file must be a JSON object"))?;
        let mut actions = Vec::with_capacity(obj.len());
        for (name, params) in obj {
            let list = params.as_array().ok_or_else(|| {
                BridgeError::config(format!("parameters of '{}' must be an array", name))
            })?;
            let params = list
                .iter()
                .map(|p| {
                    p.as_str().map(str::to_string).ok_or_else(|| {
                        BridgeError::config(format!(
                            "parameters of '{}' must be strings",
                            name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            actions.push(ActionSpec {
                name: name.clone(),
                params,
            });
        }
        Self::new(actions)
    }

    pub fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            BridgeError::config(format!(
                "cannot read actions file {}: {}",
                path.display(),
                err
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn lookup(&self, action: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|spec| spec.name == action)
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.iter().map(|spec| spec.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut out = serde_json::Map::new();
        for spec in &self.actions {
            out.insert(spec.name.clone(), serde_json::json!(spec.params));
        }
        Value::Object(out)
    }
}
