//! Invoice field extraction module.

pub mod filter;
pub mod normalize;
mod parser;
pub mod rules;
pub mod table;

pub use filter::RowFilter;
pub use normalize::normalize_text;
pub use parser::{ExtractionResult, InvoiceParser, TabularInvoiceParser};
pub use table::{price_section, reconstruct_rows, reconstruct_rows_with, RawRow, RowReconstructor};

use crate::error::ExtractionError;
use crate::models::document::OcrDocument;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract invoice data from an OCR document record.
    fn extract(&self, document: &OcrDocument) -> Result<InvoiceRecord>;

    /// Extract invoice data from plain text.
    fn extract_from_text(&self, text: &str) -> Result<InvoiceRecord>;
}
