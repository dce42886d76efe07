//! JSON review report

use crate::{ExportError, PrismaFigure, Result};
use prisma_domain::{ExtractionRow, Record, RecordId, StatusTag};
use prisma_workflow::{CountReport, FlowCounter, ProjectWorkflowState};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// An included study as it appears in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedStudy {
    /// Record id
    pub id: RecordId,
    /// Title
    pub title: String,
    /// Author names in order
    pub authors: Vec<String>,
    /// Publication year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Source tag
    pub source: String,
    /// Link
    pub url: String,
    /// Extraction row, when one was entered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionRow>,
}

impl IncludedStudy {
    fn from_record(record: &Record, extraction: Option<ExtractionRow>) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            authors: record.authors.names().into_iter().map(str::to_string).collect(),
            year: record.year,
            source: record.source.clone(),
            url: record.url.clone(),
            extraction,
        }
    }
}

/// Snapshot of a review: counts, PRISMA figure and included studies
///
/// The PRISMA figure is only present once every screening and eligibility
/// decision has been made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Project the report describes
    pub project_id: String,
    /// Unix seconds at which the report was built
    pub generated_at: u64,
    /// Flow counts
    pub counts: CountReport,
    /// PRISMA figure of a finished review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prisma: Option<PrismaFigure>,
    /// Studies in `included_final`, in record order
    pub included: Vec<IncludedStudy>,
}

impl ReviewReport {
    /// Build a report for `state`
    ///
    /// Fails only when the review is finished but its figure is incoherent.
    pub fn build(state: &ProjectWorkflowState, generated_at: u64) -> Result<Self> {
        let counts = FlowCounter::for_state(state).compute(state.records());

        let prisma = match PrismaFigure::for_state(state) {
            Ok(figure) => Some(figure),
            Err(ExportError::Pending { .. }) => None,
            Err(e) => return Err(e),
        };

        let included: Vec<IncludedStudy> = state
            .records_with_status(StatusTag::IncludedFinal)
            .map(|record| IncludedStudy::from_record(record, state.ledger().get(record.id.as_str()).copied()))
            .collect();

        tracing::info!(
            "Built report for '{}': {} included, figure {}",
            state.project_id(),
            included.len(),
            if prisma.is_some() { "complete" } else { "pending" }
        );

        Ok(Self {
            project_id: state.project_id().to_string(),
            generated_at,
            counts,
            prisma,
            included,
        })
    }

    /// Build a report stamped with the current time
    pub fn build_now(state: &ProjectWorkflowState) -> Result<Self> {
        Self::build(state, unix_now())
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialize(e.to_string()))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_domain::{Authors, Candidate};
    use prisma_workflow::WorkflowEngine;

    fn candidate(title: &str, source: &str) -> Candidate {
        Candidate {
            authors: Authors::Delimited("Smith A, Jones B".to_string()),
            year: Some(2023),
            source: source.to_string(),
            abstract_text: "Abstract".to_string(),
            ..Candidate::titled(title)
        }
    }

    #[test]
    fn test_pending_review_has_no_figure() {
        let engine = WorkflowEngine::default_config();
        let mut state = ProjectWorkflowState::new("p", engine.config());
        engine
            .ingest_records(&mut state, vec![candidate("Metformin and weight loss", "PubMed")])
            .unwrap();

        let report = ReviewReport::build(&state, 1_700_000_000).unwrap();

        assert!(report.prisma.is_none());
        assert!(report.included.is_empty());
        assert_eq!(report.counts.unscreened, 1);
        assert!(!report.to_json().unwrap().contains("\"prisma\""));
    }

    #[test]
    fn test_finished_review_carries_figure_and_rows() {
        let engine = WorkflowEngine::default_config();
        let mut state = ProjectWorkflowState::new("p", engine.config());
        let ids = engine
            .ingest_records(
                &mut state,
                vec![
                    candidate("Metformin and weight loss", "PubMed"),
                    candidate("Metformin in older adults", ""),
                ],
            )
            .unwrap();
        engine.screen_include(&mut state, ids[0].as_str()).unwrap();
        engine.eligibility_include(&mut state, ids[0].as_str()).unwrap();
        engine.screen_exclude(&mut state, ids[1].as_str()).unwrap();

        let row = ExtractionRow {
            n_intervention: Some(50),
            mean_intervention: Some(1.0),
            sd_intervention: Some(0.5),
            n_control: Some(50),
            mean_control: Some(0.5),
            sd_control: Some(0.5),
        };
        engine.set_extraction_row(&mut state, ids[0].as_str(), row).unwrap();

        let report = ReviewReport::build(&state, 42).unwrap();

        let figure = report.prisma.as_ref().unwrap();
        assert_eq!(figure.identified_databases, 1);
        assert_eq!(figure.identified_other_methods, 1);
        assert_eq!(figure.excluded_screening, 1);
        assert_eq!(figure.studies_meta_analysis, 1);
        assert_eq!(report.included.len(), 1);
        assert_eq!(report.included[0].authors, vec!["Smith A", "Jones B"]);
        assert_eq!(report.included[0].extraction, Some(row));

        let parsed: ReviewReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
