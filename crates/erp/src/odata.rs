use salesdesk_core::{CustomerId, ItemFilter};

pub const ITEMS: &str = "Items";
pub const INTERACTIONS: &str = "CRM_Interaction_Log_Entries";
pub const INVOICES: &str = "Sales_Invoice";
pub const INVOICE_LINES: &str = "Sales_InvoiceSalesLines";

/// Quotes a string literal for use inside `$filter`.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn item_filter(filter: &ItemFilter) -> String {
    match filter {
        ItemFilter::DescriptionOrModelContains(text) => {
            let literal = quote_literal(text);
            format!("contains(Description,{literal}) or contains(No,{literal})")
        }
        ItemFilter::DescriptionContains(text) => {
            format!("contains(Description,{})", quote_literal(text))
        }
    }
}

pub fn contact_filter(customer_id: &CustomerId) -> String {
    format!("Contact_No eq {}", quote_literal(&customer_id.0))
}

pub fn invoice_lines_filter(invoice_id: &str) -> String {
    format!("Document_No eq {}", quote_literal(invoice_id))
}

/// Joins an entity set onto the company root without doubling the separator.
pub fn entity_url(base_url: &str, entity_set: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), entity_set)
}
