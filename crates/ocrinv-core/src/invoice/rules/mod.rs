//! Rule-based field extractors for tabular invoices.

pub mod amounts;
pub mod header;
pub mod patterns;
pub mod vendor;

pub use amounts::{parse_amount, parse_decimal, parse_quantity, parse_rate};
pub use header::{
    extract_header_fields, BillToExtractor, HeaderFields, InvoiceDateExtractor,
    InvoiceNumberExtractor,
};
pub use patterns::*;
pub use vendor::{
    extract_vendor_address, extract_vendor_name, VendorAddressExtractor, VendorNameExtractor,
};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
