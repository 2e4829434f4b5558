//! The one external capability the engine depends on: read access to the ERP/CRM
//! catalog and interaction log.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{CatalogItem, ItemFilter};
use crate::domain::customer::CustomerId;
use crate::domain::interaction::InteractionRecord;
use crate::errors::StoreError;

pub mod memory;

pub use memory::InMemoryStore;

#[async_trait]
pub trait SalesDataStore: Send + Sync {
    /// Items passing `filter`, in the store's own order.
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, StoreError>;

    /// Interaction history for one customer. Ordering is whatever the store returns.
    async fn find_interactions(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<InteractionRecord>, StoreError>;
}

#[async_trait]
impl<T> SalesDataStore for Arc<T>
where
    T: SalesDataStore + ?Sized,
{
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, StoreError> {
        (**self).find_items(filter).await
    }

    async fn find_interactions(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        (**self).find_interactions(customer_id).await
    }
}
