use async_trait::async_trait;
use salesdesk_core::CustomerId;
use serde_json::Value;

use crate::client::{ErpClient, ErpError};
use crate::{odata, payload};

pub const DEFAULT_LIMIT: usize = 10;

/// Pass-through reads of ERP records that the engine does not interpret.
#[async_trait]
pub trait ErpRecordSource: Send + Sync {
    async fn list_interactions(
        &self,
        customer_id: Option<&CustomerId>,
        limit: usize,
    ) -> Result<Vec<Value>, ErpError>;

    async fn list_invoices(&self, limit: usize) -> Result<Vec<Value>, ErpError>;

    async fn list_invoice_lines(&self, invoice_id: &str) -> Result<Vec<Value>, ErpError>;
}

#[async_trait]
impl ErpRecordSource for ErpClient {
    async fn list_interactions(
        &self,
        customer_id: Option<&CustomerId>,
        limit: usize,
    ) -> Result<Vec<Value>, ErpError> {
        let mut query = vec![("$top", limit.to_string())];
        if let Some(customer_id) = customer_id {
            query.push(("$filter", odata::contact_filter(customer_id)));
        }
        let body = self.get(odata::INTERACTIONS, &query).await?;
        owned_records(odata::INTERACTIONS, &body)
    }

    async fn list_invoices(&self, limit: usize) -> Result<Vec<Value>, ErpError> {
        let body = self.get(odata::INVOICES, &[("$top", limit.to_string())]).await?;
        owned_records(odata::INVOICES, &body)
    }

    async fn list_invoice_lines(&self, invoice_id: &str) -> Result<Vec<Value>, ErpError> {
        let body = self
            .get(odata::INVOICE_LINES, &[("$filter", odata::invoice_lines_filter(invoice_id))])
            .await?;
        owned_records(odata::INVOICE_LINES, &body)
    }
}

fn owned_records(entity_set: &'static str, body: &Value) -> Result<Vec<Value>, ErpError> {
    payload::records(body)
        .map(<[Value]>::to_vec)
        .map_err(|error| ErpError::Decode { entity_set, detail: error.to_string() })
}
