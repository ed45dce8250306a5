use crate::config::{BridgeConfig, BridgeMode};
use crate::errors::BridgeError;
use crate::managers::bridge::BridgeManager;
use crate::services::command_builder::CommandBuilder;
use crate::services::logger::Logger;
use crate::services::process::{ProcessRunner, SystemProcessRunner};
use crate::services::registry::ActionRegistry;
use crate::services::response::ResponseFormatter;
use crate::services::validation::Validation;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: BridgeConfig,
    pub registry: Arc<ActionRegistry>,
    pub bridge: Arc<BridgeManager>,
}

impl App {
    pub fn initialize(config: BridgeConfig) -> Result<Self, BridgeError> {
        let logger = Logger::new("rfid-bridge");
        let runner = Arc::new(SystemProcessRunner::new(
            logger.clone(),
            config.timeout(),
            config.max_capture_bytes,
        ));
        Self::with_runner(config, logger, runner)
    }

    /// Wires the pipeline around any runner; tests pass a fake one.
    pub fn with_runner(
        config: BridgeConfig,
        logger: Logger,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self, BridgeError> {
        let registry = Arc::new(config.registry()?);
        if registry.is_empty() {
            return Err(BridgeError::config("the action registry is empty"));
        }

        if config.mode == BridgeMode::Diagnostic {
            logger.warn(
                "diagnostic mode exposes command lines and raw output to callers",
                None,
            );
        }
        logger.info(
            "initialized",
            Some(&serde_json::json!({
                "mode": config.mode.as_str(),
                "actions": registry.names(),
                "program": config.launcher.program,
                "work_dir": config.work_dir,
                "timeout_ms": config.timeout_ms,
            })),
        );

        let validation = Validation::new(registry.clone());
        let builder = CommandBuilder::new(config.launcher.clone(), &config.work_dir);
        let formatter = ResponseFormatter::new(config.mode, config.filter.clone());
        let bridge = Arc::new(BridgeManager::new(
            logger.clone(),
            validation,
            builder,
            runner,
            formatter,
        ));

        Ok(Self {
            logger,
            config,
            registry,
            bridge,
        })
    }
}
