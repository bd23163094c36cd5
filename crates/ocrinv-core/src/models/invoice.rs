//! Invoice record produced by the extraction pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Placeholder for any header field the document did not yield.
pub const UNKNOWN: &str = "Unknown";

/// Format of the invoice date as it appears in the OCR text.
pub const RAW_DATE_FORMAT: &str = "%m/%d/%y";

/// A complete invoice extracted from one OCR document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Vendor the payment goes to.
    pub vendor_name: String,

    /// City, state and ZIP of the vendor's remittance address.
    pub vendor_address: String,

    /// Invoice date exactly as captured (MM/DD/YY).
    pub date: String,

    /// Invoice number.
    pub invoice_number: String,

    /// Billed party.
    pub bill_to_name: String,

    /// Line items in reading order.
    pub items: Vec<LineItem>,
}

impl InvoiceRecord {
    /// Create a record with every header field set to [`UNKNOWN`] and no items.
    pub fn unknown() -> Self {
        Self {
            vendor_name: UNKNOWN.to_string(),
            vendor_address: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            invoice_number: UNKNOWN.to_string(),
            bill_to_name: UNKNOWN.to_string(),
            items: Vec::new(),
        }
    }

    /// Parse the raw `date` field into a calendar date.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), RAW_DATE_FORMAT).ok()
    }

    /// Sum of item totals, rounded to cents.
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| Decimal::from_f64(item.total))
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Names of header fields that fell back to [`UNKNOWN`].
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("vendor_name", &self.vendor_name),
            ("vendor_address", &self.vendor_address),
            ("date", &self.date),
            ("invoice_number", &self.invoice_number),
            ("bill_to_name", &self.bill_to_name),
        ];

        fields
            .into_iter()
            .filter(|(_, value)| value.as_str() == UNKNOWN)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A single row of the Description/Quantity/Rate/Amount table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code. This layout carries none.
    pub sku: String,

    /// Service or product description.
    pub description: String,

    /// Quantity column.
    pub quantity: f64,

    /// Tax rate. This layout carries none, serialized as null.
    pub tax_rate: Option<f64>,

    /// Rate column (unit price).
    pub price: f64,

    /// Amount column (line total).
    pub total: f64,
}

impl LineItem {
    /// Create an item with the layout's fixed `sku` and `tax_rate`.
    pub fn new(description: impl Into<String>, quantity: f64, price: f64, total: f64) -> Self {
        Self {
            sku: UNKNOWN.to_string(),
            description: description.into(),
            quantity,
            tax_rate: None,
            price,
            total,
        }
    }
}
