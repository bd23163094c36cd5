//! Tabular invoice parser: header fields plus the line item table.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::document::OcrDocument;
use crate::models::invoice::{InvoiceRecord, LineItem, UNKNOWN};

use super::filter::RowFilter;
use super::normalize::normalize_text;
use super::rules::{extract_header_fields, extract_vendor_address, extract_vendor_name};
use super::table::{price_section, reconstruct_rows_with};
use super::{InvoiceExtractor, Result};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: InvoiceRecord,
    /// Non-fatal extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice from text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Parser for the Description/Quantity/Rate/Amount invoice layout.
pub struct TabularInvoiceParser {
    filter: RowFilter,
}

impl TabularInvoiceParser {
    /// Create a parser with the built-in row rules.
    pub fn new() -> Self {
        Self {
            filter: RowFilter::default(),
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        Ok(Self {
            filter: RowFilter::from_rules(&config.rules)?,
        })
    }

    /// Header fields from the raw text. Misses stay "Unknown".
    fn extract_header(&self, text: &str) -> InvoiceRecord {
        let mut invoice = InvoiceRecord::unknown();

        if let Some(name) = extract_vendor_name(text) {
            invoice.vendor_name = name;
        }
        if let Some(address) = extract_vendor_address(text) {
            invoice.vendor_address = address;
        }

        let header = extract_header_fields(text);
        if let Some(date) = header.date {
            invoice.date = date.value;
        }
        if let Some(number) = header.invoice_number {
            invoice.invoice_number = number.value;
        }
        if let Some(bill_to) = header.bill_to_name {
            invoice.bill_to_name = bill_to.value;
        }

        invoice
    }

    fn extract_line_items(&self, text: &str, bill_to: Option<&str>) -> Result<Vec<LineItem>> {
        let normalized = normalize_text(text)?;
        let section = price_section(&normalized)?;

        // Noise between the header and the first row must not be glued onto it.
        let rows = reconstruct_rows_with(section, |line| self.filter.is_rejected(line, bill_to));
        debug!(
            "Reconstructed {} rows from {} byte price section",
            rows.len(),
            section.len()
        );

        let items: Vec<LineItem> = rows
            .iter()
            .filter_map(|row| self.filter.apply(row, bill_to))
            .collect();
        debug!("{} of {} rows kept as line items", items.len(), rows.len());

        Ok(items)
    }
}

impl Default for TabularInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for TabularInvoiceParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let mut invoice = self.extract_header(text);

        let bill_to = (invoice.bill_to_name != UNKNOWN).then_some(invoice.bill_to_name.as_str());
        let items = self.extract_line_items(text, bill_to)?;
        invoice.items = items;

        let mut warnings: Vec<String> = invoice
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();
        if invoice.items.is_empty() {
            warnings.push("No line items found in price section".to_string());
        }

        debug!(
            "Extracted invoice {} with {} items and {} warnings",
            invoice.invoice_number,
            invoice.items.len(),
            warnings.len()
        );

        Ok(ExtractionResult {
            invoice,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl InvoiceExtractor for TabularInvoiceParser {
    fn extract(&self, document: &OcrDocument) -> Result<InvoiceRecord> {
        self.extract_from_text(&document.ocr_text)
    }

    fn extract_from_text(&self, text: &str) -> Result<InvoiceRecord> {
        self.parse(text).map(|r| r.invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::models::config::{RejectRule, RowRules};
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "Acme Fiber Networks\n\
        Please make payments to: Acme Fiber Networks\n\
        Springfield, IL 62701\n\
        PO Box 4410\n\
        Invoice Date Due Date\tInvoice No.\n\
        \t01/12/24\t02/11/24\t9230090\n\
        \n\
        IncentX\n\
        Description Quantity Rate Amount\n\
        Dark Fiber\t1\t1,200.00\t$1,200.00\n\
        Route 9 segment\n\
        IncentX\t\t\t\n\
        Colocation\t2\t250.00\t500.00\n\
        \tTotal USD\t$1,700.00\n";

    #[test]
    fn test_parse_full_invoice() {
        let result = TabularInvoiceParser::new().parse(INVOICE).unwrap();
        let invoice = result.invoice;

        assert_eq!(invoice.vendor_name, "Acme Fiber Networks");
        assert_eq!(invoice.vendor_address, "Springfield, IL 62701");
        assert_eq!(invoice.date, "01/12/24");
        assert_eq!(invoice.invoice_number, "9230090");
        assert_eq!(invoice.bill_to_name, "IncentX");
        assert_eq!(
            invoice.items,
            vec![
                LineItem::new("Dark Fiber Route 9 segment", 1.0, 1200.0, 1200.0),
                LineItem::new("Colocation", 2.0, 250.0, 500.0),
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_header_fields_are_warnings() {
        let text =
            "Description Quantity Rate Amount\nWidget\t2\t10.00\t20.00\n\tTotal USD\t$20.00";
        let result = TabularInvoiceParser::new().parse(text).unwrap();

        assert_eq!(result.invoice.vendor_name, UNKNOWN);
        assert_eq!(result.invoice.items.len(), 1);
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn test_layout_failures() {
        let parser = TabularInvoiceParser::new();

        let err = parser.parse("Please make payments to: Acme\nnothing here").unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedLayout);

        let err = parser
            .parse("Description Quantity Rate Amount\nWidget\t2\t10.00\t20.00\n")
            .unwrap_err();
        assert_eq!(err, ExtractionError::PriceSectionNotFound);
    }

    #[test]
    fn test_empty_table_is_valid() {
        let text = "Description Quantity Rate Amount\nDescription\t\t\t\n\tTotal USD\t$0.00";
        let result = TabularInvoiceParser::new().parse(text).unwrap();

        assert!(result.invoice.items.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("No line items")));
    }

    #[test]
    fn test_from_config_uses_custom_rules() {
        let config = ExtractionConfig {
            rules: RowRules {
                reject: vec![RejectRule::Contains {
                    value: "colocation".to_string(),
                }],
                ..RowRules::default()
            },
        };
        let parser = TabularInvoiceParser::from_config(&config).unwrap();
        let invoice = parser.extract_from_text(INVOICE).unwrap();

        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].description, "Dark Fiber Route 9 segment");
    }

    #[test]
    fn test_bill_to_line_before_first_row_is_dropped() {
        let text = INVOICE.replace(
            "Description Quantity Rate Amount\n",
            "Description Quantity Rate Amount\nIncentX\n",
        );
        let invoice = TabularInvoiceParser::new().extract_from_text(&text).unwrap();

        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].description, "Dark Fiber Route 9 segment");
    }

    #[test]
    fn test_extract_from_document() {
        let doc = OcrDocument {
            ocr_text: INVOICE.to_string(),
        };
        let invoice = TabularInvoiceParser::new().extract(&doc).unwrap();
        assert_eq!(invoice.items.len(), 2);
    }
}
