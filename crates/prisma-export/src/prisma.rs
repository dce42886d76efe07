//! PRISMA 2020 flow figure
//!
//! The thirteen numbers of the standard diagram, derived from a finished
//! review and checked for internal coherence.

use crate::{ExportError, Result};
use indexmap::IndexMap;
use prisma_domain::StatusTag;
use prisma_workflow::{CountReport, FlowCounter, ProjectWorkflowState};
use serde::{Deserialize, Serialize};

/// Numbers shown in a PRISMA 2020 flow diagram
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrismaFigure {
    /// Records identified from databases
    pub identified_databases: usize,
    /// Records identified by other methods (records with no source tag)
    pub identified_other_methods: usize,
    /// Duplicates removed before screening
    pub duplicates_removed: usize,
    /// Records removed as incomplete before screening
    pub other_removed_before_screening: usize,
    /// Records screened on title/abstract
    pub records_screened: usize,
    /// Records excluded at screening
    pub excluded_screening: usize,
    /// Reports sought for retrieval
    pub reports_sought_retrieval: usize,
    /// Reports not retrieved
    pub reports_not_retrieved: usize,
    /// Reports assessed at full text
    pub reports_assessed_fulltext: usize,
    /// Full-text exclusions by reason
    #[serde(default)]
    pub exclusion_reasons: IndexMap<String, usize>,
    /// Total full-text exclusions
    #[serde(default)]
    pub total_excluded: usize,
    /// Studies included in qualitative synthesis
    #[serde(default)]
    pub studies_qualitative_synthesis: usize,
    /// Studies included in meta-analysis
    #[serde(default)]
    pub studies_meta_analysis: usize,
}

impl PrismaFigure {
    /// Build the figure from counts of a finished review
    ///
    /// `studies_meta_analysis` is the number of included studies with a
    /// complete extraction row. Fails while any record is still unscreened
    /// or awaiting eligibility.
    pub fn from_counts(counts: &CountReport, studies_meta_analysis: usize) -> Result<Self> {
        if counts.pending() > 0 {
            return Err(ExportError::Pending {
                unscreened: counts.unscreened,
                awaiting_eligibility: counts.sought_full_text,
            });
        }

        let other_methods = counts.identified_by_source.get("").copied().unwrap_or(0);
        let records_screened = counts.excluded_at_title + counts.excluded_full_text + counts.included_final;
        let reports_sought_retrieval = records_screened - counts.excluded_at_title;

        let figure = Self {
            identified_databases: counts.identified - other_methods,
            identified_other_methods: other_methods,
            duplicates_removed: counts.duplicates_removed,
            other_removed_before_screening: counts.removed_total(),
            records_screened,
            excluded_screening: counts.excluded_at_title,
            reports_sought_retrieval,
            reports_not_retrieved: 0,
            reports_assessed_fulltext: reports_sought_retrieval,
            exclusion_reasons: counts
                .exclusion_reasons
                .iter()
                .map(|r| (r.reason.clone(), r.count))
                .collect(),
            total_excluded: counts.excluded_full_text,
            studies_qualitative_synthesis: counts.included_final,
            studies_meta_analysis,
        };

        figure.validate()?;
        Ok(figure)
    }

    /// Build the figure for a project
    pub fn for_state(state: &ProjectWorkflowState) -> Result<Self> {
        let counts = FlowCounter::for_state(state).compute(state.records());
        let with_data = state
            .ledger()
            .rows_for(state.records(), StatusTag::IncludedFinal)
            .iter()
            .filter(|entry| entry.row.is_complete())
            .count();
        Self::from_counts(&counts, with_data)
    }

    /// Total records identified
    pub fn total_identified(&self) -> usize {
        self.identified_databases + self.identified_other_methods
    }

    /// Check the figure's internal coherence
    ///
    /// Every violated rule is reported, not just the first.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let total = self.total_identified() as i64;

        if total == 0 {
            errors.push("total identified records must be greater than 0".to_string());
        }

        let expected_screened =
            total - self.duplicates_removed as i64 - self.other_removed_before_screening as i64;
        if self.records_screened as i64 != expected_screened {
            errors.push(format!(
                "records screened inconsistent: expected {}, found {}",
                expected_screened, self.records_screened
            ));
        }

        let expected_sought = self.records_screened as i64 - self.excluded_screening as i64;
        if self.reports_sought_retrieval as i64 != expected_sought {
            errors.push(format!(
                "reports sought inconsistent: expected {}, found {}",
                expected_sought, self.reports_sought_retrieval
            ));
        }

        let expected_assessed = self.reports_sought_retrieval as i64 - self.reports_not_retrieved as i64;
        if self.reports_assessed_fulltext as i64 != expected_assessed {
            errors.push(format!(
                "reports assessed inconsistent: expected {}, found {}",
                expected_assessed, self.reports_assessed_fulltext
            ));
        }

        if !self.exclusion_reasons.is_empty() {
            let reason_total: usize = self.exclusion_reasons.values().sum();
            if reason_total != self.total_excluded {
                errors.push(format!(
                    "total excluded inconsistent: reasons sum to {}, total is {}",
                    reason_total, self.total_excluded
                ));
            }
        }

        let included = self.reports_assessed_fulltext as i64 - self.total_excluded as i64;
        if self.studies_qualitative_synthesis as i64 > included {
            errors.push(format!(
                "studies in qualitative synthesis ({}) exceed included studies ({})",
                self.studies_qualitative_synthesis, included
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ExportError::Inconsistent(errors))
        }
    }

    /// Plain-text rendering of the four diagram stages
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            "IDENTIFICATION".to_string(),
            format!("  Databases: {}", self.identified_databases),
            format!("  Other methods: {}", self.identified_other_methods),
            format!("  Total identified: {}", self.total_identified()),
            "SCREENING".to_string(),
            format!("  Duplicates removed: {}", self.duplicates_removed),
            format!("  Other removed: {}", self.other_removed_before_screening),
            format!("  Records screened: {}", self.records_screened),
            format!("  Excluded at screening: {}", self.excluded_screening),
            "ELIGIBILITY".to_string(),
            format!("  Reports sought: {}", self.reports_sought_retrieval),
            format!("  Not retrieved: {}", self.reports_not_retrieved),
            format!("  Assessed at full text: {}", self.reports_assessed_fulltext),
            format!("  Excluded: {}", self.total_excluded),
        ];
        for (reason, count) in &self.exclusion_reasons {
            lines.push(format!("    {}: {}", reason, count));
        }
        lines.push("INCLUDED".to_string());
        lines.push(format!("  Qualitative synthesis: {}", self.studies_qualitative_synthesis));
        lines.push(format!("  Meta-analysis: {}", self.studies_meta_analysis));
        lines.join("\n")
    }
}
