use tracing::debug;

use crate::domain::catalog::{CatalogItem, ItemFilter};
use crate::errors::EngineError;
use crate::store::SalesDataStore;

/// Resolves a free-text model query to a single catalog record.
pub struct CatalogMatcher<S> {
    store: S,
}

impl<S> CatalogMatcher<S>
where
    S: SalesDataStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// First candidate, in store order, whose description or model number contains the
    /// query case-insensitively. The store's own filter is only a pre-selection.
    pub async fn find(&self, query: &str) -> Result<CatalogItem, EngineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let candidates = self
            .store
            .find_items(&ItemFilter::DescriptionOrModelContains(query.to_string()))
            .await?;
        let candidate_count = candidates.len();

        let matched = candidates.into_iter().find(|candidate| candidate.matches_query(query));
        debug!(
            event_name = "engine.match.evaluated",
            query = %query,
            candidate_count,
            matched = matched.is_some(),
            "catalog candidates evaluated"
        );

        matched.ok_or_else(|| EngineError::NotFound(query.to_string()))
    }
}
