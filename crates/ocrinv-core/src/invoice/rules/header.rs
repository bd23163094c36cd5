//! Invoice header block extraction.
//!
//! The block looks like:
//!
//! ```text
//! Invoice Date Due Date<TAB>Invoice No.
//! <TAB>01/12/24<TAB>02/11/24<TAB>9230090
//!
//! IncentX
//! ```
//!
//! The anchor line is located once per block; date, invoice number and
//! bill-to name are then read independently, so one malformed value does
//! not take the others down with it.

use super::patterns::{HEADER_BLOCK_ANCHOR, INVOICE_NUMBER, SHORT_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// A located header block: the values line right below an anchor line.
struct HeaderBlock<'a> {
    text: &'a str,
    values_start: usize,
    values_end: usize,
}

impl<'a> HeaderBlock<'a> {
    fn locate_all(text: &'a str) -> Vec<Self> {
        HEADER_BLOCK_ANCHOR
            .find_iter(text)
            .filter_map(|anchor| {
                let after = anchor.end();
                let values_start = after + text[after..].find('\n')? + 1;
                let values_end = text[values_start..]
                    .find('\n')
                    .map(|i| values_start + i)
                    .unwrap_or(text.len());
                Some(Self {
                    text,
                    values_start,
                    values_end,
                })
            })
            .collect()
    }

    /// Non-empty tab-separated tokens of the values line, with byte offsets.
    fn tokens(&self) -> Vec<(usize, &'a str)> {
        let line = &self.text[self.values_start..self.values_end];
        let mut offset = self.values_start;
        let mut tokens = Vec::new();

        for raw in line.split('\t') {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let lead = raw.len() - raw.trim_start().len();
                tokens.push((offset + lead, trimmed));
            }
            offset += raw.len() + 1;
        }

        tokens
    }

    fn first_token(&self, accept: impl Fn(&str) -> bool) -> Option<ExtractionMatch<String>> {
        self.tokens()
            .into_iter()
            .find(|(_, token)| accept(*token))
            .map(|(start, token)| token_match(start, token))
    }

    fn leading_token(&self, accept: impl Fn(&str) -> bool) -> Option<ExtractionMatch<String>> {
        self.tokens()
            .into_iter()
            .next()
            .filter(|(_, token)| accept(*token))
            .map(|(start, token)| token_match(start, token))
    }

    /// First non-blank line after the values line.
    fn next_nonblank_line(&self) -> Option<ExtractionMatch<String>> {
        if self.values_end >= self.text.len() {
            return None;
        }

        let mut offset = self.values_end + 1;
        for line in self.text[offset..].split('\n') {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let start = offset + (line.len() - line.trim_start().len());
                return Some(
                    ExtractionMatch::new(trimmed.to_string(), line)
                        .with_position(start, start + trimmed.len()),
                );
            }
            offset += line.len() + 1;
        }

        None
    }
}

fn token_match(start: usize, token: &str) -> ExtractionMatch<String> {
    ExtractionMatch::new(token.to_string(), token).with_position(start, start + token.len())
}

/// Invoice date: the leading token of the values line, when it is MM/DD/YY.
pub struct InvoiceDateExtractor;

impl InvoiceDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceDateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        HeaderBlock::locate_all(text)
            .iter()
            .filter_map(|block| block.leading_token(|t| SHORT_DATE.is_match(t)))
            .collect()
    }
}

/// Invoice number: the first all-digit token of the values line.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        HeaderBlock::locate_all(text)
            .iter()
            .filter_map(|block| block.first_token(|t| INVOICE_NUMBER.is_match(t)))
            .collect()
    }
}

/// Bill-to name: the first non-blank line after the values line.
pub struct BillToExtractor;

impl BillToExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BillToExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BillToExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        HeaderBlock::locate_all(text)
            .iter()
            .filter_map(|block| block.next_nonblank_line())
            .collect()
    }
}

/// Header block fields, each found or not on its own.
#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    pub date: Option<ExtractionMatch<String>>,
    pub invoice_number: Option<ExtractionMatch<String>>,
    pub bill_to_name: Option<ExtractionMatch<String>>,
}

/// Extract date, invoice number and bill-to name from the first header block.
pub fn extract_header_fields(text: &str) -> HeaderFields {
    HeaderFields {
        date: InvoiceDateExtractor::new().extract(text),
        invoice_number: InvoiceNumberExtractor::new().extract(text),
        bill_to_name: BillToExtractor::new().extract(text),
    }
}
