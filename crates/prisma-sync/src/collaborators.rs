//! Contracts of the external collaborators
//!
//! Search, statistics and storage are black boxes behind these traits.
//! Every call may fail with a [`CollaboratorError`]; the core never retries.

use crate::CollaboratorError;
use async_trait::async_trait;
use prisma_domain::{Candidate, Record, RecordId, StatusTag};
use prisma_workflow::ExtractionEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Literature database queried by the search collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// PubMed / MEDLINE
    #[serde(rename = "pubmed")]
    PubMed,
    /// Semantic Scholar
    SemanticScholar,
    /// ArXiv / Crossref
    #[serde(rename = "arxiv")]
    ArXiv,
}

impl SearchSource {
    /// All sources in aggregation order
    pub const ALL: [SearchSource; 3] = [
        SearchSource::PubMed,
        SearchSource::SemanticScholar,
        SearchSource::ArXiv,
    ];

    /// Configuration key
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::PubMed => "pubmed",
            SearchSource::SemanticScholar => "semantic_scholar",
            SearchSource::ArXiv => "arxiv",
        }
    }

    /// Source tag stored on records
    pub fn label(&self) -> &'static str {
        match self {
            SearchSource::PubMed => "PubMed",
            SearchSource::SemanticScholar => "Semantic Scholar",
            SearchSource::ArXiv => "ArXiv",
        }
    }

    /// Parse a configuration key or label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s) || source.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Free-text search strategy per source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchStrategies {
    /// PubMed query
    pub pubmed: String,
    /// Semantic Scholar query
    pub semantic_scholar: String,
    /// ArXiv / Crossref query
    #[serde(alias = "arxivCrossref")]
    pub arxiv: String,
}

impl SearchStrategies {
    /// Strategy text for `source`
    pub fn get(&self, source: SearchSource) -> &str {
        match source {
            SearchSource::PubMed => &self.pubmed,
            SearchSource::SemanticScholar => &self.semantic_scholar,
            SearchSource::ArXiv => &self.arxiv,
        }
    }

    /// Replace the strategy text for `source`
    pub fn set(&mut self, source: SearchSource, text: impl Into<String>) {
        let text = text.into();
        match source {
            SearchSource::PubMed => self.pubmed = text,
            SearchSource::SemanticScholar => self.semantic_scholar = text,
            SearchSource::ArXiv => self.arxiv = text,
        }
    }

    /// Enabled sources with a non-blank strategy, in aggregation order
    pub fn active<'a>(&'a self, enabled: &'a [SearchSource]) -> impl Iterator<Item = (SearchSource, &'a str)> + 'a {
        SearchSource::ALL
            .into_iter()
            .filter(move |source| enabled.contains(source))
            .map(move |source| (source, self.get(source).trim()))
            .filter(|(_, text)| !text.is_empty())
    }

    /// Require at least one non-blank strategy among `enabled`
    pub fn validate(&self, enabled: &[SearchSource]) -> Result<(), CollaboratorError> {
        if self.active(enabled).next().is_none() {
            return Err(CollaboratorError::InvalidRequest(
                "at least one search strategy must be provided".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result returned by the statistics collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Heterogeneity metrics by name (e.g. `i_squared`, `q`, `p_value`)
    pub heterogeneity: BTreeMap<String, f64>,
    /// References to rendered plots
    pub plot_artifacts: Vec<String>,
}

/// Literature search collaborator
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `strategy` against `sources`, returning candidates without status
    async fn search(&self, strategy: &str, sources: &[SearchSource]) -> Result<Vec<Candidate>, CollaboratorError>;
}

/// Meta-analysis collaborator
#[async_trait]
pub trait StatisticsEngine: Send + Sync {
    /// Analyze extraction rows of the included studies
    async fn analyze(&self, rows: &[ExtractionEntry]) -> Result<AnalysisOutcome, CollaboratorError>;
}

/// Remote record storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of a project, with status
    async fn load(&self, project_id: &str) -> Result<Vec<Record>, CollaboratorError>;

    /// Replace the stored records of a project
    async fn save(&self, project_id: &str, records: &[Record]) -> Result<(), CollaboratorError>;

    /// Persist one status change
    async fn update_status(
        &self,
        record_id: &RecordId,
        status: StatusTag,
        reason: Option<&str>,
    ) -> Result<(), CollaboratorError>;

    /// Remove every record of a project
    async fn delete_all(&self, project_id: &str) -> Result<(), CollaboratorError>;
}

/// Free-text field persisted by autosave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    /// PICO question definition
    Pico,
    /// Search strategy of one source
    Strategy(SearchSource),
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::Pico => f.write_str("pico"),
            DraftField::Strategy(source) => write!(f, "strategy.{}", source.as_str()),
        }
    }
}

/// Sink for autosaved drafts
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persist the latest value of a field
    async fn save_draft(&self, project_id: &str, field: DraftField, value: &str) -> Result<(), CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(SearchSource::parse("PubMed"), Some(SearchSource::PubMed));
        assert_eq!(SearchSource::parse("semantic scholar"), Some(SearchSource::SemanticScholar));
        assert_eq!(SearchSource::parse("semantic_scholar"), Some(SearchSource::SemanticScholar));
        assert_eq!(SearchSource::parse(" arxiv "), Some(SearchSource::ArXiv));
        assert_eq!(SearchSource::parse("scopus"), None);
    }

    #[test]
    fn test_blank_strategies_rejected() {
        let strategies = SearchStrategies {
            pubmed: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            strategies.validate(&SearchSource::ALL),
            Err(CollaboratorError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_active_skips_blank_and_disabled() {
        let strategies = SearchStrategies {
            pubmed: "metformin[MeSH]".to_string(),
            semantic_scholar: String::new(),
            arxiv: "metformin diabetes".to_string(),
        };
        let all: Vec<_> = strategies.active(&SearchSource::ALL).collect();
        assert_eq!(
            all,
            vec![
                (SearchSource::PubMed, "metformin[MeSH]"),
                (SearchSource::ArXiv, "metformin diabetes")
            ]
        );

        let only_scholar = [SearchSource::SemanticScholar];
        assert!(strategies.validate(&only_scholar).is_err());
    }

    #[test]
    fn test_strategies_accept_original_field_names() {
        let strategies: SearchStrategies =
            toml::from_str("pubmed = \"a\"\nsemanticScholar = \"b\"\narxivCrossref = \"c\"").unwrap();
        assert_eq!(strategies.get(SearchSource::SemanticScholar), "b");
        assert_eq!(strategies.get(SearchSource::ArXiv), "c");
    }

    #[test]
    fn test_draft_field_display() {
        assert_eq!(DraftField::Pico.to_string(), "pico");
        assert_eq!(DraftField::Strategy(SearchSource::ArXiv).to_string(), "strategy.arxiv");
    }
}
