use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

/// A value the upstream store may or may not report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reported<T> {
    Known(T),
    Unknown,
}

impl<T> Reported<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for Reported<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.known().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Reported<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelNo(String);

impl ModelNo {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvariantViolation("model number must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelNo {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelNo> for String {
    fn from(value: ModelNo) -> Self {
        value.0
    }
}

impl std::fmt::Display for ModelNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a sellable item as reported by the catalog for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub model_no: ModelNo,
    pub description: String,
    pub stock: Reported<u64>,
    pub unit_price: Reported<Decimal>,
}

impl CatalogItem {
    /// Case-insensitive containment of `query` in the description or model number.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.description.to_lowercase().contains(&needle)
            || self.model_no.as_str().to_lowercase().contains(&needle)
    }
}

/// Upstream-side narrowing of the catalog. The store may apply it loosely; callers
/// re-check whatever final predicate they need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemFilter {
    DescriptionOrModelContains(String),
    DescriptionContains(String),
}
