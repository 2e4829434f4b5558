pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod store;

pub use domain::catalog::{CatalogItem, ItemFilter, ModelNo, Reported};
pub use domain::customer::{CustomerId, CustomerProfile, Purchase};
pub use domain::follow_up::{ContactMethod, DataQualityFlag, FollowUpPlan, FollowUpTiming};
pub use domain::interaction::{InteractionRecord, InteractionTimestamp};
pub use domain::recommendation::{Recommendation, RecommendationSource, MAX_RECOMMENDATIONS};
pub use engine::{
    CatalogMatcher, FollowUpPolicy, FollowUpStrategist, RecommendationComposer,
    RecommendationRules, SalesEngine,
};
pub use errors::{DomainError, EngineError, InterfaceError, StoreError};
pub use store::{InMemoryStore, SalesDataStore};
