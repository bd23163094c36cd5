//! Core library for turning OCR'd invoice text into structured records.
//!
//! This crate provides:
//! - OCR text normalization (page breaks, repeated banners, blank lines)
//! - Line item table reconstruction from tab-delimited OCR output
//! - Configurable row filtering and description cleanup
//! - Header field extraction (vendor, address, date, invoice number, bill-to)
//! - Invoice record models and pipeline configuration

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{ExtractionError, OcrinvError, Result};
pub use invoice::{
    ExtractionResult, InvoiceExtractor, InvoiceParser, RowFilter, TabularInvoiceParser,
};
pub use models::config::{BatchConfig, ExtractionConfig, OcrinvConfig, RejectRule, RowRules};
pub use models::document::{OcrDocument, ReferenceDocument};
pub use models::invoice::{InvoiceRecord, LineItem, UNKNOWN};
