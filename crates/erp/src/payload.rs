use std::str::FromStr;

use rust_decimal::Decimal;
use salesdesk_core::{
    CatalogItem, CustomerId, InteractionRecord, InteractionTimestamp, ModelNo, Reported,
    StoreError,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Returns the records of an OData collection response (`{"value": [...]}`).
pub fn records(body: &Value) -> Result<&[Value], StoreError> {
    body.get("value")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| StoreError::Malformed("response has no `value` array".to_string()))
}

/// Parses catalog rows. Rows without a model number are skipped so one bad row does not
/// hide the rest of the batch.
pub fn parse_items(body: &Value) -> Result<Vec<CatalogItem>, StoreError> {
    let mut items = Vec::new();
    for (index, record) in records(body)?.iter().enumerate() {
        if let Some(item) = parse_item(index, record)? {
            items.push(item);
        }
    }
    Ok(items)
}

fn parse_item(index: usize, record: &Value) -> Result<Option<CatalogItem>, StoreError> {
    let fields = as_object(index, record)?;
    let raw_no = fields.get("No").and_then(Value::as_str).unwrap_or_default();
    let Ok(model_no) = ModelNo::new(raw_no) else {
        warn!(
            event_name = "erp.payload.item_skipped",
            index,
            "catalog row has no model number"
        );
        return Ok(None);
    };

    Ok(Some(CatalogItem {
        model_no,
        description: string_field(fields, "Description"),
        stock: fields.get("Inventory").map(stock).unwrap_or(Reported::Unknown),
        unit_price: fields.get("Unit_Price").map(price).unwrap_or(Reported::Unknown),
    }))
}

/// Parses interaction log entries. Entries without a contact number are attributed to
/// `requested`, the customer the query was filtered on.
pub fn parse_interactions(
    body: &Value,
    requested: &CustomerId,
) -> Result<Vec<InteractionRecord>, StoreError> {
    records(body)?
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let fields = as_object(index, record)?;
            let customer_id = fields
                .get("Contact_No")
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())
                .map(|value| CustomerId(value.to_string()))
                .unwrap_or_else(|| requested.clone());

            Ok(InteractionRecord {
                customer_id,
                timestamp: InteractionTimestamp::parse(&string_field(fields, "Date")),
                notes: string_field(fields, "Description"),
                objections: Vec::new(),
            })
        })
        .collect()
}

fn as_object(index: usize, record: &Value) -> Result<&Map<String, Value>, StoreError> {
    record
        .as_object()
        .ok_or_else(|| StoreError::Malformed(format!("record #{index} is not an object")))
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn stock(value: &Value) -> Reported<u64> {
    if let Some(units) = value.as_u64() {
        return Reported::Known(units);
    }
    match value.as_f64() {
        Some(units) if units.is_finite() && units >= 0.0 => Reported::Known(units.floor() as u64),
        _ => Reported::Unknown,
    }
}

fn price(value: &Value) -> Reported<Decimal> {
    let Value::Number(number) = value else {
        return Reported::Unknown;
    };
    let text = number.to_string();
    let parsed = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text));
    match parsed {
        Ok(amount) if !amount.is_sign_negative() => Reported::Known(amount),
        _ => Reported::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salesdesk_core::{CustomerId, InteractionTimestamp, Reported, StoreError};
    use serde_json::json;

    use super::{parse_interactions, parse_items, records};

    #[test]
    fn missing_value_array_is_malformed() {
        let error = records(&json!({"error": "nope"})).expect_err("must reject envelope");
        assert!(matches!(error, StoreError::Malformed(_)));

        let error = records(&json!({"value": {"No": "PKM60"}})).expect_err("must reject object");
        assert!(matches!(error, StoreError::Malformed(_)));
    }

    #[test]
    fn items_map_known_and_unknown_fields() {
        let body = json!({"value": [
            {"No": "PKM60", "Description": "PKM60 PUMP", "Inventory": 12, "Unit_Price": 4500.5},
            {"No": "DDP-60", "Description": "DDP 60", "Inventory": null},
            {"No": "ACC-1", "Description": "ACCESSORY", "Inventory": "lots", "Unit_Price": -3},
            {"No": "ACC-2", "Description": "ACCESSORY", "Inventory": 7.9, "Unit_Price": "12"}
        ]});

        let items = parse_items(&body).expect("items should parse");

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].model_no.as_str(), "PKM60");
        assert_eq!(items[0].stock, Reported::Known(12));
        assert_eq!(items[0].unit_price, Reported::Known(Decimal::new(45005, 1)));
        assert_eq!(items[1].stock, Reported::Unknown);
        assert_eq!(items[1].unit_price, Reported::Unknown);
        assert_eq!(items[2].stock, Reported::Unknown);
        assert_eq!(items[2].unit_price, Reported::Unknown);
        assert_eq!(items[3].stock, Reported::Known(7));
        assert_eq!(items[3].unit_price, Reported::Unknown);
    }

    #[test]
    fn rows_without_model_number_are_skipped() {
        let body = json!({"value": [
            {"No": "PKM60"},
            {"No": "  ", "Description": "blank"},
            {"Description": "missing"},
            {"No": "DDP-60"}
        ]});

        let items = parse_items(&body).expect("valid rows should survive");

        let ids: Vec<_> = items.iter().map(|item| item.model_no.as_str()).collect();
        assert_eq!(ids, vec!["PKM60", "DDP-60"]);
    }

    #[test]
    fn non_object_item_is_malformed() {
        let error = parse_items(&json!({"value": [{"No": "PKM60"}, 42]}))
            .expect_err("number record must be rejected");

        assert!(matches!(error, StoreError::Malformed(ref detail) if detail.contains("#1")));
    }

    #[test]
    fn interactions_keep_unparsable_dates_visible() {
        let requested = CustomerId("CT-9".to_string());
        let body = json!({"value": [
            {"Contact_No": "CT-9", "Date": "2024-05-01", "Description": "Called about pricing"},
            {"Date": "yesterday"}
        ]});

        let history = parse_interactions(&body, &requested).expect("history should parse");

        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp.parsed().is_some());
        assert_eq!(history[0].notes, "Called about pricing");
        assert_eq!(history[1].customer_id, requested);
        assert_eq!(history[1].timestamp, InteractionTimestamp::Unparsable("yesterday".to_string()));
    }

    #[test]
    fn non_object_interaction_is_malformed() {
        let error = parse_interactions(&json!({"value": ["oops"]}), &CustomerId("C".to_string()))
            .expect_err("string record must be rejected");

        assert!(matches!(error, StoreError::Malformed(_)));
    }
}
