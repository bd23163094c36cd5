//! Document records supplied by the external OCR service.
//!
//! Only `ocr_text` is used for extraction. Everything else the service
//! returns is ignored, except when a record is read back as a reference
//! for verification.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

use crate::error::Result;

/// Timestamp format the OCR service uses for its own `date` field.
pub const REFERENCE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Input record: the raw OCR text of one document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrDocument {
    /// Full OCR text. A record without it extracts as empty text.
    #[serde(default)]
    pub ocr_text: String,
}

impl OcrDocument {
    /// Parse a document record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The OCR service's own interpretation of a document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceDocument {
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub vendor: ReferenceParty,
    pub bill_to: ReferenceParty,
    pub line_items: Vec<ReferenceLineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceParty {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceLineItem {
    pub total: Option<f64>,
}

impl ReferenceDocument {
    /// Parse a reference record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Calendar date of the reference `date` timestamp.
    pub fn issue_date(&self) -> Option<chrono::NaiveDate> {
        let raw = self.date.as_deref()?;
        NaiveDateTime::parse_from_str(raw.trim(), REFERENCE_DATE_FORMAT)
            .ok()
            .map(|dt| dt.date())
    }

    /// Sum of line item totals, rounded to cents.
    pub fn items_total(&self) -> Decimal {
        self.line_items
            .iter()
            .filter_map(|item| item.total.and_then(Decimal::from_f64))
            .sum::<Decimal>()
            .round_dp(2)
    }
}
