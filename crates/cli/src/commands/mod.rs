pub mod config;
pub mod doctor;
pub mod follow_up;
pub mod match_item;
pub mod recommend;

use std::future::Future;

use salesdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use salesdesk_core::{EngineError, SalesEngine};
use salesdesk_erp::ErpClient;
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_NOT_FOUND: u8 = 3;
pub const EXIT_UPSTREAM: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn config_failure(command: &str, error: &ConfigError) -> Self {
        Self::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    }

    pub fn engine_failure(command: &str, error: &EngineError) -> Self {
        match error {
            EngineError::NotFound(_) => {
                Self::failure(command, "not_found", error.to_string(), EXIT_NOT_FOUND)
            }
            EngineError::EmptyQuery => {
                Self::failure(command, "invalid_input", error.to_string(), EXIT_NOT_FOUND)
            }
            EngineError::Upstream(_) => {
                Self::failure(command, "upstream_unavailable", error.to_string(), EXIT_UPSTREAM)
            }
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Serializes a command's result payload, reporting serialization failure as a command error.
pub(crate) fn to_data<T: Serialize>(command: &str, value: &T) -> Result<Value, CommandResult> {
    serde_json::to_value(value)
        .map_err(|error| CommandResult::failure(command, "serialization", error.to_string(), 1))
}

/// Runs `future` to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(command: &str, future: F) -> Result<F::Output, CommandResult> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            CommandResult::failure(
                command,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        })?;
    Ok(runtime.block_on(future))
}

/// Loads configuration and wires the engine to the configured ERP.
pub(crate) fn erp_engine(command: &str) -> Result<SalesEngine<ErpClient>, CommandResult> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| CommandResult::config_failure(command, &error))?;
    let client = ErpClient::new(&config.erp).map_err(|error| {
        CommandResult::failure(command, "erp_client", error.to_string(), EXIT_UPSTREAM)
    })?;
    Ok(SalesEngine::new(client, config.recommendations, config.follow_up))
}
