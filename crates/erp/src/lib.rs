//! OData client for the ERP that holds the item catalog, CRM interaction log and
//! sales invoices.
//!
//! [`ErpClient`] implements the core [`SalesDataStore`](salesdesk_core::SalesDataStore)
//! collaborator and is the only place upstream JSON is turned into domain types.

pub mod client;
pub mod odata;
pub mod payload;
pub mod records;

pub use client::{ErpClient, ErpError};
pub use records::ErpRecordSource;
