//! Error types for domain value construction

use thiserror::Error;

/// Errors raised while building or decoding domain values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Status tag outside the closed set
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Completeness field name that does not map to a removal status
    #[error("Invalid completeness field: {0}")]
    InvalidField(String),

    /// Exclusion reason was blank
    #[error("Exclusion reason must not be empty")]
    EmptyExclusionReason,

    /// `excluded_fulltext` decoded without its reason
    #[error("Status excluded_fulltext requires an exclusion reason")]
    MissingExclusionReason,

    /// A reason was attached to a status that does not carry one
    #[error("Status {0} does not carry an exclusion reason")]
    UnexpectedExclusionReason(String),

    /// Extraction value that is not an acceptable number
    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidExtractionValue {
        /// Field name
        field: String,
        /// Offending raw input
        value: String,
        /// Why it was rejected
        reason: String,
    },
}
