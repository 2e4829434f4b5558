use std::sync::Arc;

use salesdesk_agent::{client_from_config, AdvisorError, LlmError, SalesAdvisor};
use salesdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use salesdesk_core::SalesEngine;
use salesdesk_erp::{ErpClient, ErpError};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiState, DynStore};

pub struct Application {
    pub config: AppConfig,
    pub state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("ERP client setup failed: {0}")]
    Erp(#[from] ErpError),
    #[error("LLM client setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error("advisor setup failed: {0}")]
    Advisor(#[from] AdvisorError),
}

#[cfg_attr(not(test), allow(dead_code))]
pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let erp = Arc::new(ErpClient::new(&config.erp)?);
    let store: DynStore = erp.clone();
    let engine = SalesEngine::new(store, config.recommendations.clone(), config.follow_up);
    info!(
        event_name = "system.bootstrap.erp_configured",
        correlation_id = "bootstrap",
        erp_base_url = %erp.base_url(),
        "ERP client configured"
    );

    let llm = client_from_config(&config.llm)?;
    let advisor = SalesAdvisor::new(llm)?;
    info!(
        event_name = "system.bootstrap.llm_configured",
        correlation_id = "bootstrap",
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "LLM client configured"
    );

    Ok(Application {
        state: ApiState { engine: Arc::new(engine), records: erp, advisor: Arc::new(advisor) },
        config,
    })
}
