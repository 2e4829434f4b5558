use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::SalesDataStore;
use crate::domain::catalog::{CatalogItem, ItemFilter};
use crate::domain::customer::CustomerId;
use crate::domain::interaction::InteractionRecord;
use crate::errors::StoreError;

/// Store backed by process memory. Used by tests and offline demos.
#[derive(Default)]
pub struct InMemoryStore {
    items: RwLock<Vec<CatalogItem>>,
    interactions: RwLock<HashMap<CustomerId, Vec<InteractionRecord>>>,
    failure: RwLock<Option<StoreError>>,
    ignore_filters: bool,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items: RwLock::new(items), ..Self::default() }
    }

    /// Return every item regardless of filter, like an upstream whose filter is looser
    /// than the caller's own test.
    pub fn ignoring_filters(mut self) -> Self {
        self.ignore_filters = true;
        self
    }

    pub fn with_interactions(
        self,
        customer_id: CustomerId,
        records: Vec<InteractionRecord>,
    ) -> Self {
        if let Ok(mut interactions) = self.interactions.write() {
            interactions.insert(customer_id, records);
        }
        self
    }

    /// Every subsequent call fails with `error` until cleared.
    pub fn fail_with(&self, error: Option<StoreError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = error;
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.failure.read().map_err(|_| poisoned())?;
        match failure.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Transport("in-memory store lock is poisoned".to_string())
}

fn passes(item: &CatalogItem, filter: &ItemFilter) -> bool {
    match filter {
        ItemFilter::DescriptionOrModelContains(text) => {
            item.description.contains(text.as_str()) || item.model_no.as_str().contains(text.as_str())
        }
        ItemFilter::DescriptionContains(text) => item.description.contains(text.as_str()),
    }
}

#[async_trait]
impl SalesDataStore for InMemoryStore {
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<CatalogItem>, StoreError> {
        self.begin_call()?;
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().filter(|item| self.ignore_filters || passes(item, filter)).cloned().collect())
    }

    async fn find_interactions(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        self.begin_call()?;
        let interactions = self.interactions.read().map_err(|_| poisoned())?;
        Ok(interactions.get(customer_id).cloned().unwrap_or_default())
    }
}
