//! Data models for invoices, OCR documents and configuration.

pub mod config;
pub mod document;
pub mod invoice;
