//! Error types for collaborator calls and session operations

use prisma_workflow::WorkflowError;
use thiserror::Error;

/// Failure reported by an external collaborator
///
/// Carries a human-readable message for display; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Service could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Service answered with an error
    #[error("Request failed: {0}")]
    Failed(String),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors that can occur during session operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Search collaborator failure
    #[error("Search error: {0}")]
    Search(CollaboratorError),

    /// Statistics collaborator failure
    #[error("Statistics error: {0}")]
    Statistics(CollaboratorError),

    /// Record store failure
    #[error("Storage error: {0}")]
    Store(CollaboratorError),

    /// Rejected workflow operation
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task error (channel closed, task panicked)
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SyncError>;
