//! Error types for workflow operations

use crate::Operation;
use prisma_domain::{DomainError, RecordId, StatusTag};
use thiserror::Error;

/// Errors that can occur during workflow operations
///
/// Every error leaves the project state exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// No record with this id in the project
    #[error("Record not found: {0}")]
    UnknownRecord(RecordId),

    /// The record is not in the status the operation requires
    #[error("Invalid transition: {operation} on {id} requires status {expected}, found {actual}")]
    PreconditionFailed {
        /// Rejected operation
        operation: Operation,
        /// Target record
        id: RecordId,
        /// Status the operation requires
        expected: StatusTag,
        /// Status the record actually has
        actual: StatusTag,
    },

    /// Ingestion would create a second record with the same id
    #[error("Duplicate record id: {0}")]
    DuplicateId(RecordId),

    /// Full-text exclusion without a reason
    #[error("Exclusion reason must not be empty")]
    EmptyReason,

    /// Malformed domain value (status, extraction row)
    #[error("Invalid input: {0}")]
    Domain(#[from] DomainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
