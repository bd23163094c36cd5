//! Numeric column parsing for line items.
//!
//! Columns use US formatting ("1,234.50", "$2,000.00"). A token that does
//! not parse never fails the row; it becomes `0.0`. That includes values
//! beyond `Decimal`'s range (about 7.9e28), which no invoice column reaches.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

/// Parse a US-formatted number, dropping thousands separators.
///
/// Returns `None` for empty, malformed, negative or out of range input.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .ok()
        .filter(|value| !value.is_sign_negative())
}

/// Quantity column.
pub fn parse_quantity(s: &str) -> f64 {
    to_f64(parse_decimal(s))
}

/// Rate column.
pub fn parse_rate(s: &str) -> f64 {
    to_f64(parse_decimal(s))
}

/// Amount column, which may carry a dollar sign.
pub fn parse_amount(s: &str) -> f64 {
    to_f64(parse_decimal(&s.replace('$', "")))
}

fn to_f64(value: Option<Decimal>) -> f64 {
    value.and_then(|d| d.to_f64()).unwrap_or(0.0)
}
