use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub name: String,
    pub contact_info: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub purchase_history: Vec<Purchase>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Purchase>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Purchase>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CustomerProfile {
    /// Distinct, non-empty category tags in first-seen order.
    pub fn purchased_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for category in self.purchase_history.iter().filter_map(|p| p.category.as_deref()) {
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    pub fn has_purchased_category(&self, category: &str) -> bool {
        self.purchased_categories().contains(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerId, CustomerProfile, Purchase};

    #[test]
    fn categories_are_distinct_and_case_sensitive() {
        let profile = CustomerProfile {
            id: CustomerId("C-001".to_string()),
            name: "Kilimo Farms".to_string(),
            contact_info: "ops@kilimo.test".to_string(),
            industry: None,
            purchase_history: vec![
                Purchase { category: Some("PUMPS".to_string()) },
                Purchase { category: None },
                Purchase { category: Some("PUMPS".to_string()) },
                Purchase { category: Some("pumps".to_string()) },
                Purchase { category: Some(String::new()) },
            ],
        };

        assert_eq!(profile.purchased_categories(), vec!["PUMPS", "pumps"]);
        assert!(profile.has_purchased_category("PUMPS"));
        assert!(!profile.has_purchased_category("SOLAR"));
    }

    #[test]
    fn profile_deserializes_without_optional_fields() {
        let profile: CustomerProfile = serde_json::from_str(
            r#"{"id":"C-9","name":"Acme","contact_info":"+254700000000"}"#,
        )
        .expect("profile should deserialize");

        assert!(profile.industry.is_none());
        assert!(profile.purchase_history.is_empty());
    }

    #[test]
    fn null_history_and_extra_purchase_fields_are_tolerated() {
        let profile: CustomerProfile = serde_json::from_str(
            r#"{"id":"C-9","name":"Acme","contact_info":"x","purchase_history":null}"#,
        )
        .expect("null history should deserialize");
        assert!(profile.purchase_history.is_empty());

        let profile: CustomerProfile = serde_json::from_str(
            r#"{"id":"C-9","name":"Acme","contact_info":"x",
                "purchase_history":[{"category":"PUMPS","sku":"PKM60","qty":2},{"category":null}]}"#,
        )
        .expect("extra fields should be ignored");
        assert_eq!(profile.purchased_categories(), vec!["PUMPS"]);
    }
}
