use crate::constants::limits::LOG_SNIPPET_BYTES;
use crate::errors::BridgeError;
use crate::services::command_builder::CommandBuilder;
use crate::services::logger::Logger;
use crate::services::process::ProcessRunner;
use crate::services::request::IncomingRequest;
use crate::services::response::{BridgeResponse, ResponseFormatter};
use crate::services::validation::Validation;
use crate::utils::suggest::suggest;
use crate::utils::text::truncate_utf8_prefix;
use serde_json::json;
use std::sync::Arc;

/// Runs one request through validate -> build -> execute -> format.
#[derive(Clone)]
pub struct BridgeManager {
    logger: Logger,
    validation: Validation,
    builder: CommandBuilder,
    runner: Arc<dyn ProcessRunner>,
    formatter: ResponseFormatter,
}

impl BridgeManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        builder: CommandBuilder,
        runner: Arc<dyn ProcessRunner>,
        formatter: ResponseFormatter,
    ) -> Self {
        Self {
            logger: logger.child("bridge"),
            validation,
            builder,
            runner,
            formatter,
        }
    }

    /// Entry point for surfaces whose request parsing may already have failed.
    pub async fn respond(&self, parsed: Result<IncomingRequest, BridgeError>) -> BridgeResponse {
        match parsed {
            Ok(request) => self.handle(&request).await,
            Err(err) => {
                self.log_rejection("-", &err);
                self.formatter.error(None, None, &err)
            }
        }
    }

    /// Never fails: every outcome becomes exactly one response.
    pub async fn handle(&self, request: &IncomingRequest) -> BridgeResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        let action = request.action.as_deref();

        let command = match self.validation.validate(request) {
            Ok(command) => command,
            Err(err) => {
                self.log_rejection(&request_id, &err);
                return self.formatter.error(action, None, &err);
            }
        };

        let invocation = self.builder.build(&command);
        self.logger.info(
            "executing",
            Some(&json!({
                "request_id": request_id,
                "action": command.action(),
                "command": invocation.display(),
            })),
        );

        let result = match self.runner.run(&invocation).await {
            Ok(result) => result,
            Err(err) => {
                self.logger.error(
                    &err.to_string(),
                    Some(&json!({
                        "request_id": request_id,
                        "action": command.action(),
                        "kind": err.kind(),
                    })),
                );
                return self
                    .formatter
                    .error(Some(command.action()), Some(&invocation), &err);
            }
        };

        let meta = json!({
            "request_id": request_id,
            "action": command.action(),
            "exit_code": result.exit_code,
            "duration_ms": result.duration_ms,
        });
        if result.success() {
            self.logger.info("completed", Some(&meta));
        } else {
            self.logger.warn("program exited with failure", Some(&meta));
        }
        // Clean responses never carry stderr; keep it in the log instead.
        let stderr = result.stderr.trim();
        if !stderr.is_empty() {
            self.logger.warn(
                "program stderr",
                Some(&json!({
                    "request_id": request_id,
                    "stderr": truncate_utf8_prefix(stderr, LOG_SNIPPET_BYTES),
                })),
            );
        }

        self.formatter.result(command.action(), &invocation, &result)
    }

    fn log_rejection(&self, request_id: &str, err: &BridgeError) {
        let mut meta = json!({
            "request_id": request_id,
            "kind": err.kind(),
            "error": err.to_string(),
        });
        if let BridgeError::UnknownAction { action } = err {
            let known = self.validation.registry().names();
            meta["action"] = json!(action);
            meta["did_you_mean"] = json!(suggest(action, &known, 3));
        }
        self.logger.info("request rejected", Some(&meta));
    }
}
