//! Configuration for workflow operations
//!
//! Defines the duplicate threshold, the exclusion-reason catalog and the
//! completeness rules applied before screening.

use crate::WorkflowError;
use prisma_domain::MissingField;
use serde::{Deserialize, Serialize};

/// Configuration for the workflow engine
///
/// # Examples
///
/// ```
/// use prisma_workflow::WorkflowConfig;
///
/// // Default configuration (balanced)
/// let config = WorkflowConfig::default();
/// assert_eq!(config.duplicate_threshold, 0.95);
///
/// // Aggressive deduplication and completeness removal
/// let config = WorkflowConfig::aggressive();
/// assert_eq!(config.completeness_fields.len(), 5);
///
/// // Lenient: only near-identical titles count as duplicates
/// let config = WorkflowConfig::lenient();
/// assert!(config.duplicate_threshold > 0.95);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Minimum title similarity for two records to be duplicates
    /// Default: 0.95
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    /// Ordered human-facing exclusion reasons offered at eligibility
    /// Free text outside this list is always accepted as "other"
    #[serde(default = "default_exclusion_reasons")]
    pub exclusion_reasons: Vec<String>,

    /// Fields whose absence removes a record before screening, applied in order
    /// Default: none (completeness removal is opt-in)
    #[serde(default)]
    pub completeness_fields: Vec<MissingField>,
}

fn default_duplicate_threshold() -> f64 {
    0.95
}

fn default_exclusion_reasons() -> Vec<String> {
    [
        "No comparative data",
        "Inadequate study design",
        "Prevention rather than treatment",
        "Poor methodology",
        "Duplicate data",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: default_duplicate_threshold(),
            exclusion_reasons: default_exclusion_reasons(),
            completeness_fields: Vec::new(),
        }
    }
}

impl WorkflowConfig {
    /// Aggressive preset: looser duplicate matching, every completeness rule
    pub fn aggressive() -> Self {
        Self {
            duplicate_threshold: 0.90,
            completeness_fields: MissingField::ALL.to_vec(),
            ..Self::default()
        }
    }

    /// Lenient preset: near-exact duplicates only, no completeness rules
    pub fn lenient() -> Self {
        Self {
            duplicate_threshold: 0.98,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if !(self.duplicate_threshold > 0.0 && self.duplicate_threshold <= 1.0) {
            return Err(WorkflowError::Config(format!(
                "duplicate_threshold must be in (0.0, 1.0], got {}",
                self.duplicate_threshold
            )));
        }

        let mut seen = Vec::with_capacity(self.exclusion_reasons.len());
        for reason in &self.exclusion_reasons {
            let key = reason.trim().to_lowercase();
            if key.is_empty() {
                return Err(WorkflowError::Config(
                    "exclusion_reasons must not contain blank entries".to_string(),
                ));
            }
            if seen.contains(&key) {
                return Err(WorkflowError::Config(format!(
                    "exclusion reason '{}' listed twice",
                    reason.trim()
                )));
            }
            seen.push(key);
        }

        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, WorkflowError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| WorkflowError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, WorkflowError> {
        toml::to_string_pretty(self)
            .map_err(|e| WorkflowError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
