//! Common regex patterns for tabular invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Table header, anywhere in the text
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)Description\s+Quantity\s+Rate\s+Amount"
    ).unwrap();

    // Repeated page banners and footers, tested per line
    pub static ref PAGE_BANNER: Regex = Regex::new(
        r"(?i)^\s*(?:Invoice|Page\s+\d+\s+of\s+\d+)"
    ).unwrap();

    // Price section boundaries
    pub static ref PRICE_SECTION_START: Regex = Regex::new(
        r"(?m)^[ \t]*Description\s+Quantity\s+Rate\s+Amount[ \t]*$"
    ).unwrap();

    pub static ref PRICE_SECTION_END: Regex = Regex::new(
        r"(?m)^\tTotal\s+USD"
    ).unwrap();

    // "Widget Install 2" -> ("Widget Install ", "2"). Lazy prefix so the
    // whole trailing number is captured, separators included.
    pub static ref TRAILING_QUANTITY: Regex = Regex::new(
        r"^(.*?\D)(\d[\d.,]*)$"
    ).unwrap();

    // Vendor
    pub static ref VENDOR_NAME: Regex = Regex::new(
        r"Please make payments to:\s*(.+)"
    ).unwrap();

    pub static ref VENDOR_ADDRESS: Regex = Regex::new(
        r"(?m)^([\w ,]+ \d{5}(?:-\d{4})?)[ \t]*\r?\nPO Box"
    ).unwrap();

    // Invoice header block
    pub static ref HEADER_BLOCK_ANCHOR: Regex = Regex::new(
        r"(?m)^[ \t]*Invoice Date[ \t]+Due Date[ \t]+Invoice No\.?[ \t]*\r?$"
    ).unwrap();

    pub static ref SHORT_DATE: Regex = Regex::new(
        r"^\d{2}/\d{2}/\d{2}$"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();
}
