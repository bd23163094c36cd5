//! OCR text cleanup ahead of table reconstruction.

use tracing::debug;

use crate::error::ExtractionError;

use super::rules::patterns::{PAGE_BANNER, TABLE_HEADER};
use super::Result;

const PAGE_BREAK: char = '\u{c}';

/// Strip page breaks, repeated page banners/footers and blank lines.
///
/// Fails with [`ExtractionError::UnsupportedLayout`] when the cleaned text
/// has no "Description Quantity Rate Amount" header. Lines are kept verbatim,
/// leading tabs included, since they carry the table's column structure.
pub fn normalize_text(raw: &str) -> Result<String> {
    let text = raw.replace(PAGE_BREAK, "\n").replace('\r', "");

    let mut dropped = 0usize;
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            let banner = PAGE_BANNER.is_match(line);
            if banner {
                dropped += 1;
            }
            !banner && !line.trim().is_empty()
        })
        .collect();

    debug!("Normalized OCR text: kept {} lines, dropped {} banner lines", lines.len(), dropped);

    let normalized = lines.join("\n");
    if !TABLE_HEADER.is_match(&normalized) {
        return Err(ExtractionError::UnsupportedLayout);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RAW: &str = concat!(
        "Acme Fiber\r\n\n",
        "Description Quantity Rate Amount\n",
        "Dark Fiber\t1\t100.00\t100.00\n",
        "\u{c}Invoice 9230090 continued\n",
        "  Page 2 of 3\n\n",
        "\tTotal USD\t$100.00\n",
    );

    #[test]
    fn test_normalize_strips_banners_and_blank_lines() {
        let normalized = normalize_text(RAW).unwrap();
        assert_eq!(
            normalized,
            concat!(
                "Acme Fiber\nDescription Quantity Rate Amount\n",
                "Dark Fiber\t1\t100.00\t100.00\n\tTotal USD\t$100.00",
            )
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_text(RAW).unwrap();
        let twice = normalize_text(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_header_is_unsupported() {
        let err = normalize_text("Acme\nItem Qty Price Total\n\tTotal USD\t1.00").unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedLayout);
    }

    #[test]
    fn test_header_on_banner_line_does_not_count() {
        let err = normalize_text("Invoice Description Quantity Rate Amount\n").unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedLayout);
    }

    #[test]
    fn test_header_is_case_insensitive() {
        assert!(normalize_text("DESCRIPTION   QUANTITY RATE\tAMOUNT\n").is_ok());
    }
}
