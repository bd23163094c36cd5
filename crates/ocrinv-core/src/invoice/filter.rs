//! Line item filtering and cleanup.
//!
//! Page headers, remittance banners and account numbers that OCR interleaves
//! with the table survive reconstruction as rows. The filter drops them using
//! a [`RowRules`] denylist, cleans what remains and parses the numeric columns.

use regex::Regex;
use tracing::debug;

use crate::error::{OcrinvError, Result};
use crate::models::config::{RejectRule, RowRules, SpliceRule};
use crate::models::invoice::LineItem;

use super::rules::amounts::{parse_amount, parse_quantity, parse_rate};
use super::table::RawRow;

/// A reject rule ready to match. Literal values are lower-cased once here.
enum CompiledRule {
    Equals(String),
    StartsWith(String),
    Contains(String),
    ContainsAll(Vec<String>),
    ShortPrefix { value: String, max_len: usize },
    Pattern(Regex),
}

impl CompiledRule {
    fn compile(rule: &RejectRule) -> Result<Self> {
        Ok(match rule {
            RejectRule::Equals { value } => CompiledRule::Equals(value.to_lowercase()),
            RejectRule::StartsWith { value } => CompiledRule::StartsWith(value.to_lowercase()),
            RejectRule::Contains { value } => CompiledRule::Contains(value.to_lowercase()),
            RejectRule::ContainsAll { values } => {
                CompiledRule::ContainsAll(values.iter().map(|v| v.to_lowercase()).collect())
            }
            RejectRule::ShortPrefix { value, max_len } => CompiledRule::ShortPrefix {
                value: value.to_lowercase(),
                max_len: *max_len,
            },
            RejectRule::Pattern { regex } => Regex::new(&format!("^(?:{regex})$"))
                .map(CompiledRule::Pattern)
                .map_err(|e| {
                    OcrinvError::Config(format!("invalid reject pattern {regex:?}: {e}"))
                })?,
        })
    }

    /// `trimmed` is the description as written, `folded` its lower-cased form.
    fn matches(&self, trimmed: &str, folded: &str) -> bool {
        match self {
            CompiledRule::Equals(value) => folded == value,
            CompiledRule::StartsWith(value) => folded.starts_with(value.as_str()),
            CompiledRule::Contains(value) => folded.contains(value.as_str()),
            CompiledRule::ContainsAll(values) => values.iter().all(|v| folded.contains(v.as_str())),
            CompiledRule::ShortPrefix { value, max_len } => {
                folded.starts_with(value.as_str()) && folded.chars().count() < *max_len
            }
            CompiledRule::Pattern(re) => re.is_match(trimmed),
        }
    }
}

/// Classifies reconstructed rows and turns survivors into line items.
pub struct RowFilter {
    reject: Vec<CompiledRule>,
    strip: Vec<Regex>,
    splices: Vec<SpliceRule>,
}

impl RowFilter {
    /// Compile a rules table. Fails on an invalid regex.
    pub fn from_rules(rules: &RowRules) -> Result<Self> {
        let reject = rules
            .reject
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;

        let strip = rules
            .strip_patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| OcrinvError::Config(format!("invalid strip pattern {p:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            reject,
            strip,
            splices: rules.splices.clone(),
        })
    }

    /// Whether the row is banner, header or account-number noise.
    ///
    /// `bill_to` is the extracted bill-to name, or `None` when it is unknown.
    pub fn is_rejected(&self, description: &str, bill_to: Option<&str>) -> bool {
        let trimmed = description.trim();
        let folded = trimmed.to_lowercase();

        if let Some(name) = bill_to.map(|n| n.trim().to_lowercase()) {
            if !name.is_empty() && folded.contains(&name) {
                return true;
            }
        }

        self.reject.iter().any(|rule| rule.matches(trimmed, &folded))
    }

    /// Remove banner fragments and repair run-together descriptions.
    pub fn clean_description(&self, description: &str) -> String {
        let mut cleaned = description.to_string();
        for re in &self.strip {
            cleaned = re.replace_all(&cleaned, "").into_owned();
        }
        let mut cleaned = cleaned.trim().to_string();

        for splice in &self.splices {
            if !cleaned.starts_with(&splice.prefix) {
                continue;
            }
            if let Some(pos) = cleaned[splice.prefix.len()..].find(&splice.marker) {
                let cut = splice.prefix.len() + pos;
                debug!("Splitting run-together description at {:?}", splice.marker);
                cleaned = cleaned[..cut].trim().to_string();
            }
        }

        cleaned
    }

    /// Turn a raw row into a line item, or drop it.
    pub fn apply(&self, row: &RawRow, bill_to: Option<&str>) -> Option<LineItem> {
        if self.is_rejected(&row.description, bill_to) {
            debug!("Rejected row: {:?}", row.description);
            return None;
        }

        Some(LineItem::new(
            self.clean_description(row.description.trim()),
            parse_quantity(&row.quantity),
            parse_rate(&row.rate),
            parse_amount(&row.amount),
        ))
    }
}

impl Default for RowFilter {
    fn default() -> Self {
        Self::from_rules(&RowRules::default()).expect("default row rules compile")
    }
}
