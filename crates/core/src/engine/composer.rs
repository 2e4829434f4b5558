//! Recommendation composition.
//!
//! Three ordered passes fill a list capped at [`MAX_RECOMMENDATIONS`]:
//! catalog accessories for past pump buyers, one industry rule, then a generic backfill
//! pool. Each pass only appends product ids not already present, so earlier passes win.
//! Catalog failures in the first pass are absorbed and replaced by a single static
//! fallback entry; composing never fails.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::catalog::ItemFilter;
use crate::domain::customer::CustomerProfile;
use crate::domain::recommendation::{
    Recommendation, RecommendationList, RecommendationSource, MAX_RECOMMENDATIONS,
};
use crate::errors::DomainError;
use crate::store::SalesDataStore;

/// Minimum size of the generic backfill pool.
pub const MIN_BACKFILL_ENTRIES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: String,
    pub name: String,
    pub reason: String,
}

impl RecommendationEntry {
    pub fn new(id: &str, name: &str, reason: &str) -> Self {
        Self { id: id.to_string(), name: name.to_string(), reason: reason.to_string() }
    }

    fn recommend(&self, source: RecommendationSource) -> Recommendation {
        Recommendation {
            product_id: self.id.clone(),
            name: self.name.clone(),
            reason: self.reason.clone(),
            source,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryRule {
    /// Purchase category that triggers the lookup, compared as stored.
    pub trigger_category: String,
    /// Literal substring searched for in catalog descriptions.
    pub keyword: String,
    pub reason: String,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationRules {
    pub accessories: AccessoryRule,
    pub fallback: RecommendationEntry,
    /// Keys are lowercase industry tags.
    pub industries: BTreeMap<String, RecommendationEntry>,
    pub backfill: Vec<RecommendationEntry>,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        let industries = [
            (
                "agriculture",
                RecommendationEntry::new(
                    "IRRIGATION-01",
                    "Irrigation System Kit",
                    "Popular in your industry",
                ),
            ),
            (
                "construction",
                RecommendationEntry::new(
                    "DPUMP-01",
                    "Dewatering Pump Set",
                    "Essential for construction projects",
                ),
            ),
            (
                "residential",
                RecommendationEntry::new(
                    "HWPUMP-01",
                    "Home Water System",
                    "Perfect for residential applications",
                ),
            ),
        ]
        .into_iter()
        .map(|(industry, entry)| (industry.to_string(), entry))
        .collect();

        Self {
            accessories: AccessoryRule {
                trigger_category: "PUMPS".to_string(),
                keyword: "ACCESSORY".to_string(),
                reason: "Complements your previous pump purchases".to_string(),
                limit: MAX_RECOMMENDATIONS,
            },
            fallback: RecommendationEntry::new(
                "PKM-ACC-01",
                "Pump Controller",
                "Complements your previous pump purchases",
            ),
            industries,
            backfill: vec![
                RecommendationEntry::new("PKM60", "PKM60 Pump", "Bestselling product"),
                RecommendationEntry::new(
                    "DDP-60",
                    "DDP 60 Water Pump",
                    "High performance and reliability",
                ),
                RecommendationEntry::new(
                    "SOLAR-PUMP-01",
                    "Solar Pump System",
                    "Energy-efficient solution",
                ),
            ],
        }
    }
}

impl RecommendationRules {
    pub fn industry_rule(&self, industry: &str) -> Option<&RecommendationEntry> {
        self.industries.get(&industry.to_lowercase())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let rule = &self.accessories;
        if rule.trigger_category.is_empty() || rule.keyword.is_empty() {
            return Err(DomainError::InvariantViolation(
                "accessory rule needs a trigger category and a keyword".to_string(),
            ));
        }

        validate_entry("fallback", &self.fallback)?;
        for (industry, entry) in &self.industries {
            if industry.trim().is_empty() || *industry != industry.to_lowercase() {
                return Err(DomainError::InvariantViolation(format!(
                    "industry key `{industry}` must be non-empty lowercase"
                )));
            }
            validate_entry(&format!("industry `{industry}`"), entry)?;
        }

        if self.backfill.len() < MIN_BACKFILL_ENTRIES {
            return Err(DomainError::InvariantViolation(format!(
                "backfill pool needs at least {MIN_BACKFILL_ENTRIES} entries, found {}",
                self.backfill.len()
            )));
        }
        let mut seen = HashSet::new();
        for entry in &self.backfill {
            validate_entry("backfill", entry)?;
            if !seen.insert(entry.id.as_str()) {
                return Err(DomainError::InvariantViolation(format!(
                    "backfill pool lists `{}` more than once",
                    entry.id
                )));
            }
        }

        Ok(())
    }
}

fn validate_entry(label: &str, entry: &RecommendationEntry) -> Result<(), DomainError> {
    if entry.id.trim().is_empty() || entry.name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "{label} recommendation needs a non-empty id and name"
        )));
    }
    Ok(())
}

pub struct RecommendationComposer<S> {
    store: S,
    rules: RecommendationRules,
}

impl<S> RecommendationComposer<S>
where
    S: SalesDataStore,
{
    pub fn new(store: S, rules: RecommendationRules) -> Self {
        Self { store, rules }
    }

    pub fn rules(&self) -> &RecommendationRules {
        &self.rules
    }

    pub async fn compose(&self, profile: &CustomerProfile) -> Vec<Recommendation> {
        let mut list = RecommendationList::new();

        self.purchase_history_pass(profile, &mut list).await;
        self.industry_pass(profile, &mut list);
        self.backfill_pass(&mut list);

        debug!(
            event_name = "engine.recommend.composed",
            customer_id = %profile.id,
            count = list.len(),
            "recommendations composed"
        );
        list.into_vec()
    }

    async fn purchase_history_pass(&self, profile: &CustomerProfile, list: &mut RecommendationList) {
        let rule = &self.rules.accessories;
        if !profile.has_purchased_category(&rule.trigger_category) {
            return;
        }

        let filter = ItemFilter::DescriptionContains(rule.keyword.clone());
        match self.store.find_items(&filter).await {
            Ok(accessories) => {
                for accessory in accessories.into_iter().take(rule.limit) {
                    list.push(Recommendation {
                        product_id: accessory.model_no.into(),
                        name: accessory.description,
                        reason: rule.reason.clone(),
                        source: RecommendationSource::CatalogAccessory,
                    });
                }
            }
            Err(error) => {
                warn!(
                    event_name = "engine.recommend.catalog_fallback",
                    customer_id = %profile.id,
                    error = %error,
                    "accessory lookup failed, using static fallback"
                );
                list.push(self.rules.fallback.recommend(RecommendationSource::Fallback));
            }
        }
    }

    fn industry_pass(&self, profile: &CustomerProfile, list: &mut RecommendationList) {
        let Some(entry) = profile.industry.as_deref().and_then(|i| self.rules.industry_rule(i))
        else {
            return;
        };
        list.push(entry.recommend(RecommendationSource::IndustryRule));
    }

    fn backfill_pass(&self, list: &mut RecommendationList) {
        for entry in &self.rules.backfill {
            if list.is_full() {
                break;
            }
            list.push(entry.recommend(RecommendationSource::Backfill));
        }
    }
}
