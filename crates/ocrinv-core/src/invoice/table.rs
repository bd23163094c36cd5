//! Line item table reconstruction from normalized OCR text.
//!
//! OCR emits the Description/Quantity/Rate/Amount table as tab-separated
//! lines, but long descriptions wrap onto lines without tabs and columns
//! sometimes collapse (the quantity glued onto the description). The
//! reconstructor walks the price section line by line and rebuilds one
//! [`RawRow`] per logical table row.

use tracing::{debug, trace};

use crate::error::ExtractionError;

use super::rules::patterns::{PRICE_SECTION_END, PRICE_SECTION_START, TRAILING_QUANTITY};
use super::Result;

const COLUMN_DELIMITER: char = '\t';

/// A table row before filtering and number parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub description: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

impl RawRow {
    pub fn new(
        description: impl Into<String>,
        quantity: impl Into<String>,
        rate: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            quantity: quantity.into(),
            rate: rate.into(),
            amount: amount.into(),
        }
    }

    /// Split a tab-delimited line into a row.
    ///
    /// Four or more tokens: the last three are the numeric columns and the
    /// rest form the description. Three tokens: the quantity is assumed to be
    /// glued onto the end of the description and is split off. Anything else
    /// is not a row boundary.
    pub fn from_line(line: &str) -> Option<Self> {
        if !line.contains(COLUMN_DELIMITER) {
            return None;
        }

        let tokens: Vec<&str> = line.split(COLUMN_DELIMITER).collect();
        match tokens.len() {
            n if n >= 4 => {
                let (description, columns) = tokens.split_at(n - 3);
                let description = description
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(Self::new(
                    description,
                    columns[0].trim(),
                    columns[1].trim(),
                    columns[2].trim(),
                ))
            }
            3 => {
                let caps = TRAILING_QUANTITY.captures(tokens[0].trim())?;
                Some(Self::new(
                    caps[1].trim(),
                    caps[2].trim(),
                    tokens[1].trim(),
                    tokens[2].trim(),
                ))
            }
            _ => None,
        }
    }

    fn append_description(&mut self, text: &str) {
        append_words(&mut self.description, text);
    }
}

fn append_words(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Reconstruction state.
#[derive(Debug)]
enum RowState {
    /// No row opened yet. Wrapped text seen so far is held for the first row.
    NoOpenRow { pending: String },
    /// A row is open and absorbs continuation lines until the next boundary.
    OpenRow(RawRow),
}

/// Incremental builder turning price section lines into rows.
pub struct RowReconstructor<'a> {
    state: RowState,
    rows: Vec<RawRow>,
    discard_orphan: Box<dyn Fn(&str) -> bool + 'a>,
}

impl<'a> RowReconstructor<'a> {
    pub fn new() -> Self {
        Self::with_orphan_filter(|_| false)
    }

    /// Lines seen before the first row are dropped when `discard` matches
    /// them, instead of being held for that row.
    pub fn with_orphan_filter(discard: impl Fn(&str) -> bool + 'a) -> Self {
        Self {
            state: RowState::NoOpenRow {
                pending: String::new(),
            },
            rows: Vec::new(),
            discard_orphan: Box::new(discard),
        }
    }

    /// Feed one line of the price section.
    pub fn push_line(&mut self, line: &str) {
        match RawRow::from_line(line) {
            Some(row) => self.open(row),
            None => self.extend(line.trim()),
        }
    }

    /// Close the open row, if any, and return every row in reading order.
    pub fn finish(self) -> Vec<RawRow> {
        let mut rows = self.rows;
        match self.state {
            RowState::OpenRow(row) => rows.push(row),
            RowState::NoOpenRow { pending } if !pending.is_empty() => {
                debug!("Discarding text with no table row to attach to: {:?}", pending);
            }
            RowState::NoOpenRow { .. } => {}
        }
        rows
    }

    fn open(&mut self, mut row: RawRow) {
        let previous = std::mem::replace(
            &mut self.state,
            RowState::NoOpenRow {
                pending: String::new(),
            },
        );

        match previous {
            RowState::OpenRow(done) => self.rows.push(done),
            RowState::NoOpenRow { mut pending } if !pending.is_empty() => {
                append_words(&mut pending, &row.description);
                row.description = pending;
            }
            RowState::NoOpenRow { .. } => {}
        }

        trace!("Opened row: {:?}", row);
        self.state = RowState::OpenRow(row);
    }

    fn extend(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match &mut self.state {
            RowState::OpenRow(row) => row.append_description(text),
            RowState::NoOpenRow { .. } if (self.discard_orphan)(text) => {
                debug!("Dropping noise line before the first row: {:?}", text);
            }
            RowState::NoOpenRow { pending } => append_words(pending, text),
        }
    }
}

impl Default for RowReconstructor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// The text between the table header line and the "\tTotal USD" line.
pub fn price_section(normalized: &str) -> Result<&str> {
    let start = PRICE_SECTION_START
        .find(normalized)
        .ok_or(ExtractionError::PriceSectionNotFound)?;
    let end = PRICE_SECTION_END
        .find_at(normalized, start.end())
        .ok_or(ExtractionError::PriceSectionNotFound)?;

    Ok(&normalized[start.end()..end.start()])
}

/// Rebuild the table rows of a price section.
pub fn reconstruct_rows(section: &str) -> Vec<RawRow> {
    reconstruct_rows_with(section, |_| false)
}

/// Rebuild the table rows, dropping lines before the first row that
/// `discard_orphan` matches.
pub fn reconstruct_rows_with(
    section: &str,
    discard_orphan: impl Fn(&str) -> bool,
) -> Vec<RawRow> {
    let mut reconstructor = RowReconstructor::with_orphan_filter(discard_orphan);
    for line in section.lines() {
        reconstructor.push_line(line);
    }
    reconstructor.finish()
}
