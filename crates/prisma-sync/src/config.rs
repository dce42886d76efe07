//! Configuration for collaborator synchronization

use crate::{SearchSource, SyncError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a review session's side effects
///
/// # Examples
///
/// ```
/// use prisma_sync::SyncConfig;
///
/// let config = SyncConfig::default();
/// assert_eq!(config.autosave_debounce_ms, 1000);
/// assert_eq!(config.enabled_sources.len(), 3);
///
/// // Local-only session
/// let config = SyncConfig::offline("scratch");
/// assert!(!config.persist_status_changes);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Project identifier used for storage calls
    pub project_id: String,

    /// Quiet period before a draft edit is persisted (milliseconds)
    /// Default: 1000
    #[serde(default = "default_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// Sources queried by searches
    /// Default: all three
    #[serde(default = "default_sources")]
    pub enabled_sources: Vec<SearchSource>,

    /// Push each committed status change to the record store
    /// Default: true
    #[serde(default = "default_persist")]
    pub persist_status_changes: bool,
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_sources() -> Vec<SearchSource> {
    SearchSource::ALL.to_vec()
}

fn default_persist() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::for_project("default")
    }
}

impl SyncConfig {
    /// Default settings for a named project
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            autosave_debounce_ms: default_debounce_ms(),
            enabled_sources: default_sources(),
            persist_status_changes: true,
        }
    }

    /// Session that never writes status changes to the record store
    pub fn offline(project_id: impl Into<String>) -> Self {
        Self {
            persist_status_changes: false,
            ..Self::for_project(project_id)
        }
    }

    /// Debounce window as a duration
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.project_id.trim().is_empty() {
            return Err(SyncError::Config("project_id must not be empty".to_string()));
        }

        if self.autosave_debounce_ms == 0 || self.autosave_debounce_ms > 60_000 {
            return Err(SyncError::Config(
                "autosave_debounce_ms must be between 1 and 60000".to_string(),
            ));
        }

        if self.enabled_sources.is_empty() {
            return Err(SyncError::Config(
                "at least one search source must be enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SyncError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| SyncError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, SyncError> {
        toml::to_string_pretty(self)
            .map_err(|e| SyncError::Config(format!("Failed to serialize TOML: {}", e)))
    }
}
