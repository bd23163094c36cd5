//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for ocrinv.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrinvConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rules separating genuine line items from banner and header noise.
    pub rules: RowRules,
}

/// Denylist and repair table applied to reconstructed table rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowRules {
    /// A row whose description matches any of these is dropped.
    pub reject: Vec<RejectRule>,

    /// Regexes whose match (to end of description) is removed.
    pub strip_patterns: Vec<String>,

    /// Repairs for two line items OCR ran together.
    pub splices: Vec<SpliceRule>,
}

impl Default for RowRules {
    fn default() -> Self {
        Self {
            reject: vec![
                RejectRule::Pattern {
                    regex: r"[A-Z]-\d+".to_string(),
                },
                RejectRule::StartsWith {
                    value: "po box".to_string(),
                },
                RejectRule::Contains {
                    value: "invoice date".to_string(),
                },
                RejectRule::StartsWith {
                    value: "micro merchant systems".to_string(),
                },
                RejectRule::StartsWith {
                    value: "account no.".to_string(),
                },
                RejectRule::Equals {
                    value: "description".to_string(),
                },
                RejectRule::ShortPrefix {
                    value: "o-".to_string(),
                    max_len: 15,
                },
                RejectRule::ContainsAll {
                    values: vec!["incentx".to_string(), "main st".to_string()],
                },
                RejectRule::Pattern {
                    regex: r"(?i)w-\d+".to_string(),
                },
            ],
            strip_patterns: vec![r"(?i)Invoice\s+switch.*".to_string()],
            splices: vec![SpliceRule {
                prefix: "Transport | 506 Gbps Fiber to 49SxN6".to_string(),
                marker: "Transport | Switch Fiber Pair".to_string(),
            }],
        }
    }
}

/// A single denylist entry.
///
/// Literal rules compare against the trimmed, lower-cased description.
/// `pattern` must match the whole trimmed description as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectRule {
    Equals { value: String },
    StartsWith { value: String },
    Contains { value: String },
    ContainsAll { values: Vec<String> },
    /// Starts with `value` and is shorter than `max_len` characters.
    ShortPrefix { value: String, max_len: usize },
    Pattern { regex: String },
}

/// Truncate a description that starts with `prefix` at the first `marker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceRule {
    pub prefix: String,
    pub marker: String,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed concurrently.
    pub jobs: usize,

    /// File extension of OCR document records when scanning a directory.
    pub extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            extension: "json".to_string(),
        }
    }
}

impl OcrinvConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
