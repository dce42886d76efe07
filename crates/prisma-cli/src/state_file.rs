//! JSON file holding one project's workflow state.

use crate::error::{CliError, Result};
use prisma_workflow::{ProjectWorkflowState, WorkflowConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of a project state file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// State file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create a new empty project, refusing to overwrite unless `force`.
    pub fn create(&self, project_id: &str, config: &WorkflowConfig, force: bool) -> Result<ProjectWorkflowState> {
        if project_id.trim().is_empty() {
            return Err(CliError::InvalidInput("Project id must not be empty".to_string()));
        }
        if self.exists() && !force {
            return Err(CliError::State(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }

        let state = ProjectWorkflowState::new(project_id.trim(), config);
        self.save(&state)?;
        Ok(state)
    }

    /// Read the project state.
    pub fn load(&self) -> Result<ProjectWorkflowState> {
        if !self.exists() {
            return Err(CliError::State(format!(
                "{} not found (run 'init' first)",
                self.path.display()
            )));
        }

        let contents = fs::read_to_string(&self.path)?;
        let state: ProjectWorkflowState = serde_json::from_str(&contents)
            .map_err(|e| CliError::State(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!("Loaded {} records from {}", state.len(), self.path.display());
        Ok(state)
    }

    /// Write the project state.
    pub fn save(&self, state: &ProjectWorkflowState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        tracing::debug!("Saved {} records to {}", state.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("review.json"));

        let created = file.create("metformin", &WorkflowConfig::default(), false).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded, created);
        assert_eq!(loaded.project_id(), "metformin");
        assert_eq!(loaded.catalog().entries().len(), 5);
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("review.json"));
        file.create("a", &WorkflowConfig::default(), false).unwrap();

        assert!(matches!(
            file.create("b", &WorkflowConfig::default(), false),
            Err(CliError::State(_))
        ));
        assert_eq!(file.create("b", &WorkflowConfig::default(), true).unwrap().project_id(), "b");
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("review.json"));
        assert!(matches!(file.load(), Err(CliError::State(_))));

        fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(file.load(), Err(CliError::State(_))));
    }

    #[test]
    fn test_blank_project_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("review.json"));
        assert!(matches!(
            file.create("  ", &WorkflowConfig::default(), false),
            Err(CliError::InvalidInput(_))
        ));
        assert!(!file.exists());
    }
}
