use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::customer::CustomerId;
use crate::domain::follow_up::{DataQualityFlag, FollowUpPlan};
use crate::domain::interaction::{InteractionRecord, InteractionTimestamp};
use crate::errors::EngineError;
use crate::store::SalesDataStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPolicy {
    /// Recency assumed when the latest interaction's date cannot be read.
    pub unparsable_recency_days: i64,
}

impl Default for FollowUpPolicy {
    fn default() -> Self {
        Self { unparsable_recency_days: 7 }
    }
}

pub struct FollowUpStrategist<S> {
    store: S,
    policy: FollowUpPolicy,
}

impl<S> FollowUpStrategist<S>
where
    S: SalesDataStore,
{
    pub fn new(store: S, policy: FollowUpPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn plan(&self, customer_id: &CustomerId) -> Result<FollowUpPlan, EngineError> {
        self.plan_at(customer_id, Utc::now()).await
    }

    pub async fn plan_at(
        &self,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<FollowUpPlan, EngineError> {
        let history = self.store.find_interactions(customer_id).await?;
        let plan = plan_from_history(&history, now, self.policy);

        if let Some(DataQualityFlag::UnparsableTimestamp { raw }) = &plan.data_quality {
            warn!(
                event_name = "engine.follow_up.unparsable_timestamp",
                customer_id = %customer_id,
                raw_timestamp = %raw,
                "interaction date could not be parsed"
            );
        }
        debug!(
            event_name = "engine.follow_up.planned",
            customer_id = %customer_id,
            interaction_count = plan.interaction_count,
            timing = ?plan.timing,
            "follow-up plan derived"
        );

        Ok(plan)
    }
}

/// Derives a plan from a customer's history as of `now`.
///
/// Recency comes from the latest parsed timestamp. Any unparsable timestamp flags the
/// plan, and when nothing parses the placeholder recency from `policy` is used.
pub fn plan_from_history(
    history: &[InteractionRecord],
    now: DateTime<Utc>,
    policy: FollowUpPolicy,
) -> FollowUpPlan {
    if history.is_empty() {
        return FollowUpPlan::no_history();
    }

    let flag = first_unparsable(history)
        .map(|raw| DataQualityFlag::UnparsableTimestamp { raw: raw.to_string() });
    let days = match latest_parsed(history) {
        Some(at) => (now - at).num_days().max(0),
        None => policy.unparsable_recency_days.max(0),
    };

    FollowUpPlan::with_history(history.len(), days, flag)
}

/// The timestamp a newest-first ordering puts first among the parsed records.
fn latest_parsed(history: &[InteractionRecord]) -> Option<DateTime<Utc>> {
    history.iter().filter_map(|record| record.timestamp.parsed()).max()
}

fn first_unparsable(history: &[InteractionRecord]) -> Option<&str> {
    history.iter().find_map(|record| match &record.timestamp {
        InteractionTimestamp::Unparsable(raw) => Some(raw.as_str()),
        InteractionTimestamp::Parsed(_) => None,
    })
}
