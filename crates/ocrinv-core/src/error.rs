//! Error types for the ocrinv-core library.

use thiserror::Error;

/// Main error type for the ocrinv library.
#[derive(Error, Debug)]
pub enum OcrinvError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Malformed document record or configuration JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl OcrinvError {
    /// Whether the caller should skip this document and carry on with the batch.
    pub fn is_layout_failure(&self) -> bool {
        matches!(self, OcrinvError::Extraction(_))
    }
}

/// Hard failures that stop extraction of a single document.
///
/// Neither is retryable: the text simply does not follow the supported
/// Description/Quantity/Rate/Amount layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The table header is absent after normalization.
    #[error("document does not match the expected invoice layout")]
    UnsupportedLayout,

    /// The table header was found but the closing "Total USD" line was not.
    #[error("could not locate the price list section")]
    PriceSectionNotFound,
}

/// Result type for the ocrinv library.
pub type Result<T> = std::result::Result<T, OcrinvError>;
