//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Project state file error
    #[error("State file error: {0}")]
    State(String),

    /// Rejected workflow operation
    #[error(transparent)]
    Workflow(#[from] prisma_workflow::WorkflowError),

    /// Search or collaborator failure
    #[error(transparent)]
    Sync(#[from] prisma_sync::SyncError),

    /// Export failure
    #[error(transparent)]
    Export(#[from] prisma_export::ExportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
