//! Sales engagement decision engine: catalog matching, recommendation composition and
//! follow-up planning. The components are independent and hold no state between calls.

pub mod composer;
pub mod matcher;
pub mod strategist;

use chrono::{DateTime, Utc};

pub use composer::{AccessoryRule, RecommendationComposer, RecommendationEntry, RecommendationRules};
pub use matcher::CatalogMatcher;
pub use strategist::{plan_from_history, FollowUpPolicy, FollowUpStrategist};

use crate::domain::catalog::CatalogItem;
use crate::domain::customer::{CustomerId, CustomerProfile};
use crate::domain::follow_up::FollowUpPlan;
use crate::domain::recommendation::Recommendation;
use crate::errors::EngineError;
use crate::store::SalesDataStore;

/// The three engine operations over one shared store handle.
pub struct SalesEngine<S> {
    matcher: CatalogMatcher<S>,
    composer: RecommendationComposer<S>,
    strategist: FollowUpStrategist<S>,
}

impl<S> SalesEngine<S>
where
    S: SalesDataStore + Clone,
{
    pub fn new(store: S, rules: RecommendationRules, policy: FollowUpPolicy) -> Self {
        Self {
            matcher: CatalogMatcher::new(store.clone()),
            composer: RecommendationComposer::new(store.clone(), rules),
            strategist: FollowUpStrategist::new(store, policy),
        }
    }

    pub async fn match_catalog_item(&self, query: &str) -> Result<CatalogItem, EngineError> {
        self.matcher.find(query).await
    }

    pub async fn compose_recommendations(&self, profile: &CustomerProfile) -> Vec<Recommendation> {
        self.composer.compose(profile).await
    }

    pub async fn plan_follow_up(&self, customer_id: &CustomerId) -> Result<FollowUpPlan, EngineError> {
        self.strategist.plan(customer_id).await
    }

    pub async fn plan_follow_up_at(
        &self,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<FollowUpPlan, EngineError> {
        self.strategist.plan_at(customer_id, now).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::domain::catalog::{CatalogItem, ModelNo, Reported};
    use crate::domain::customer::{CustomerId, CustomerProfile};
    use crate::domain::follow_up::FollowUpTiming;
    use crate::domain::interaction::{InteractionRecord, InteractionTimestamp};
    use crate::engine::{FollowUpPolicy, RecommendationRules, SalesEngine};
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn engine_operations_share_one_store() {
        let customer = CustomerId("CT-7".to_string());
        let now = Utc::now();
        let store = Arc::new(
            InMemoryStore::new(vec![CatalogItem {
                model_no: ModelNo::new("PKM60").expect("valid model number"),
                description: "PKM60 PERIPHERAL PUMP".to_string(),
                stock: Reported::Known(3),
                unit_price: Reported::Unknown,
            }])
            .with_interactions(
                customer.clone(),
                vec![InteractionRecord {
                    customer_id: customer.clone(),
                    timestamp: InteractionTimestamp::Parsed(now - Duration::days(8)),
                    notes: "quoted borehole pump".to_string(),
                    objections: vec!["Price too high".to_string()],
                }],
            ),
        );
        let engine =
            SalesEngine::new(store.clone(), RecommendationRules::default(), FollowUpPolicy::default());

        let item = engine.match_catalog_item("pkm60").await.expect("match");
        let recommendations = engine
            .compose_recommendations(&CustomerProfile {
                id: customer.clone(),
                name: "Borehole Co".to_string(),
                contact_info: "bh@example.test".to_string(),
                industry: Some("construction".to_string()),
                purchase_history: Vec::new(),
            })
            .await;
        let plan = engine.plan_follow_up_at(&customer, now).await.expect("plan");

        assert_eq!(item.model_no.as_str(), "PKM60");
        assert_eq!(recommendations[0].product_id, "DPUMP-01");
        assert_eq!(plan.timing, FollowUpTiming::AtRisk);
        assert_eq!(store.call_count(), 2);
    }
}
