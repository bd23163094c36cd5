//! Vendor name and remittance address extraction.

use super::patterns::{VENDOR_ADDRESS, VENDOR_NAME};
use super::{ExtractionMatch, FieldExtractor};

/// Number of trailing tokens kept from the address line (city, state, ZIP).
const ADDRESS_TOKENS: usize = 3;

/// Vendor name from the "Please make payments to:" line.
pub struct VendorNameExtractor;

impl VendorNameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorNameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        VENDOR_NAME
            .captures_iter(text)
            .filter_map(|caps| {
                let name = caps.get(1)?;
                let value = name.as_str().trim();
                if value.is_empty() {
                    return None;
                }
                Some(
                    ExtractionMatch::new(value.to_string(), name.as_str())
                        .with_position(name.start(), name.end()),
                )
            })
            .collect()
    }
}

/// City, state and ZIP from the line right above "PO Box".
pub struct VendorAddressExtractor;

impl VendorAddressExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorAddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorAddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        VENDOR_ADDRESS
            .captures_iter(text)
            .filter_map(|caps| {
                let line = caps.get(1)?;
                let tokens: Vec<&str> = line.as_str().split_whitespace().collect();
                let tail = &tokens[tokens.len().saturating_sub(ADDRESS_TOKENS)..];
                Some(
                    ExtractionMatch::new(tail.join(" "), line.as_str())
                        .with_position(line.start(), line.end()),
                )
            })
            .collect()
    }
}

/// First vendor name in the text.
pub fn extract_vendor_name(text: &str) -> Option<String> {
    VendorNameExtractor::new().extract(text).map(|m| m.value)
}

/// First vendor remittance address in the text.
pub fn extract_vendor_address(text: &str) -> Option<String> {
    VendorAddressExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_name_same_line() {
        let text = "Remit\nPlease make payments to:  Acme Fiber Networks  \nPO Box 1";
        assert_eq!(extract_vendor_name(text), Some("Acme Fiber Networks".to_string()));
    }

    #[test]
    fn test_vendor_name_next_line() {
        let text = "Please make payments to:\nAcme Fiber Networks\n";
        assert_eq!(extract_vendor_name(text), Some("Acme Fiber Networks".to_string()));
    }

    #[test]
    fn test_vendor_name_missing() {
        assert_eq!(extract_vendor_name("Pay to: Acme"), None);
    }

    #[test]
    fn test_vendor_address() {
        let text =
            "Acme Fiber Networks\n100 Main Street Suite 5 Springfield, IL 62701\nPO Box 4410\n";
        let m = VendorAddressExtractor::new().extract(text).unwrap();

        assert_eq!(m.value, "Springfield, IL 62701");
        assert_eq!(m.source, "100 Main Street Suite 5 Springfield, IL 62701");
    }

    #[test]
    fn test_vendor_address_zip_plus_four() {
        let text = "Header\nAustin, TX 78701-1234\nPO Box 9\n";
        assert_eq!(extract_vendor_address(text), Some("Austin, TX 78701-1234".to_string()));
    }

    #[test]
    fn test_vendor_address_requires_po_box() {
        let text = "Header\nAustin, TX 78701\nSuite 9\n";
        assert_eq!(extract_vendor_address(text), None);
    }
}
