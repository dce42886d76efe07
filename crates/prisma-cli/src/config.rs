//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use prisma_sync::SyncConfig;
use prisma_workflow::WorkflowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// The `sync` section's `project_id` is ignored; the project always comes
/// from the state file being operated on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Deduplication threshold, exclusion catalog, completeness rules
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Search sources and persistence
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// State file used when `--state` is not given
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".prisma-flow").join("config.toml"))
    }

    /// Load configuration from the default path or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate the embedded sections.
    pub fn validate(&self) -> Result<()> {
        self.workflow
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.sync.validate().map_err(|e| CliError::Config(e.to_string()))
    }

    /// Sync settings bound to a project, never writing to a remote store.
    pub fn sync_for(&self, project_id: &str) -> SyncConfig {
        SyncConfig {
            project_id: project_id.to_string(),
            persist_status_changes: false,
            ..self.sync.clone()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            state_file: default_state_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_state_file() -> PathBuf {
    PathBuf::from("review.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_sync::SearchSource;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.state_file, PathBuf::from("review.json"));
        assert_eq!(config.workflow.duplicate_threshold, 0.95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[settings]\nformat = \"json\"\n\n[workflow]\nduplicate_threshold = 0.9\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.workflow.duplicate_threshold, 0.9);
        assert_eq!(config.workflow.exclusion_reasons.len(), 5);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sync.enabled_sources = vec![SearchSource::PubMed];
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[workflow]\nduplicate_threshold = 1.5\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_sync_for_binds_project() {
        let sync = Config::default().sync_for("metformin");
        assert_eq!(sync.project_id, "metformin");
        assert!(!sync.persist_status_changes);
    }
}
