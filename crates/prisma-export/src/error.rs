//! Error types for export operations

use thiserror::Error;

/// Errors that can occur while building or reading exports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Screening or eligibility decisions are still outstanding
    #[error("Review not finished: {unscreened} unscreened, {awaiting_eligibility} awaiting eligibility")]
    Pending {
        /// Records awaiting screening
        unscreened: usize,
        /// Records awaiting full-text eligibility
        awaiting_eligibility: usize,
    },

    /// PRISMA figure fails its coherence checks
    #[error("Inconsistent PRISMA figure:\n{}", .0.join("\n"))]
    Inconsistent(Vec<String>),

    /// Malformed delimited input
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line of the offending row
        line: usize,
        /// What went wrong
        message: String,
    },

    /// JSON serialization failed
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
