use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use salesdesk_core::config::ErpConfig;
use salesdesk_core::{
    CatalogItem, CustomerId, InteractionRecord, ItemFilter, SalesDataStore, StoreError,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::odata;
use crate::payload;

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("failed to build ERP http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("ERP request to `{entity_set}` failed: {source}")]
    Transport {
        entity_set: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("ERP rejected the configured credentials ({status})")]
    Unauthorized { status: StatusCode },
    #[error("ERP returned {status} for `{entity_set}`")]
    Status { entity_set: &'static str, status: StatusCode },
    #[error("ERP response for `{entity_set}` could not be decoded: {detail}")]
    Decode { entity_set: &'static str, detail: String },
}

impl From<ErpError> for StoreError {
    fn from(value: ErpError) -> Self {
        match value {
            ErpError::Unauthorized { .. } => Self::Unauthorized(value.to_string()),
            ErpError::Decode { .. } => Self::Malformed(value.to_string()),
            ErpError::Build(_) | ErpError::Transport { .. } | ErpError::Status { .. } => {
                Self::Transport(value.to_string())
            }
        }
    }
}

/// Classifies a non-success status from the ERP.
pub fn status_error(entity_set: &'static str, status: StatusCode) -> ErpError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErpError::Unauthorized { status },
        _ => ErpError::Status { entity_set, status },
    }
}

#[derive(Clone)]
pub struct ErpClient {
    client: Client,
    base_url: String,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ErpClient {
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ErpError::Build)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one entity set and returns the decoded JSON body.
    pub(crate) async fn get(
        &self,
        entity_set: &'static str,
        query: &[(&str, String)],
    ) -> Result<Value, ErpError> {
        let url = odata::entity_url(&self.base_url, entity_set);
        debug!(
            event_name = "erp.request.sent",
            entity_set,
            query = ?query,
            "querying ERP entity set"
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|source| {
                error!(
                    event_name = "erp.request.failed",
                    entity_set,
                    error = %source,
                    "ERP request failed"
                );
                ErpError::Transport { entity_set, source }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "erp.request.rejected",
                entity_set,
                status = %status,
                "ERP returned a non-success status"
            );
            return Err(status_error(entity_set, status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| ErpError::Decode { entity_set, detail: error.to_string() })
    }

    /// Cheapest authenticated read, used by readiness checks.
    pub async fn ping(&self) -> Result<(), ErpError> {
        let body = self.get(odata::ITEMS, &[("$top", "1".to_string())]).await?;
        payload::records(&body)
            .map(|_| ())
            .map_err(|error| ErpError::Decode { entity_set: odata::ITEMS, detail: error.to_string() })
    }
}

#[async_trait]
impl SalesDataStore for ErpClient {
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, StoreError> {
        let body = self.get(odata::ITEMS, &[("$filter", odata::item_filter(filter))]).await?;
        payload::parse_items(&body)
    }

    async fn find_interactions(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let body = self
            .get(odata::INTERACTIONS, &[("$filter", odata::contact_filter(customer_id))])
            .await?;
        payload::parse_interactions(&body, customer_id)
    }
}
