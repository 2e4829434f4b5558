use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Hard cap on recommendations handed back to a caller.
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationSource {
    CatalogAccessory,
    IndustryRule,
    Fallback,
    Backfill,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogAccessory => "catalog-accessory",
            Self::IndustryRule => "industry-rule",
            Self::Fallback => "fallback",
            Self::Backfill => "backfill",
        }
    }
}

/// Identity is the product id: two recommendations for the same product are equal
/// whatever their reason or source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "id")]
    pub product_id: String,
    pub name: String,
    pub reason: String,
    pub source: RecommendationSource,
}

impl PartialEq for Recommendation {
    fn eq(&self, other: &Self) -> bool {
        self.product_id == other.product_id
    }
}

impl Eq for Recommendation {}

impl Hash for Recommendation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.product_id.hash(state);
    }
}

/// Insertion-ordered, capped, duplicate-free recommendation list.
#[derive(Clone, Debug, Default)]
pub struct RecommendationList {
    entries: Vec<Recommendation>,
}

impl RecommendationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unless the list is full or the product is already present.
    pub fn push(&mut self, recommendation: Recommendation) -> bool {
        if self.is_full() || self.entries.contains(&recommendation) {
            return false;
        }
        self.entries.push(recommendation);
        true
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_RECOMMENDATIONS
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Recommendation> {
        self.entries
    }
}
