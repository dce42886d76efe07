//! PRISMA-style flow counts derived from the record set

use crate::{ExclusionCatalog, ProjectWorkflowState};
use prisma_domain::{MissingField, Record, RecordStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frequency of one full-text exclusion reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCount {
    /// Reason text (catalog spelling for catalog reasons)
    pub reason: String,
    /// Records excluded with this reason
    pub count: usize,
    /// Whether the reason is a catalog entry
    pub catalog: bool,
}

/// Aggregate counts over a record set
///
/// Every record lands in exactly one status bucket, so
/// [`CountReport::bucket_total`] always equals `identified`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReport {
    /// Size of the record set
    pub identified: usize,

    /// Identification counts per source tag (blank tag under `""`)
    pub identified_by_source: BTreeMap<String, usize>,

    /// Records marked `duplicate`
    pub duplicates_removed: usize,

    /// `removed_without_*` counts per field, all five always present
    pub removed_incomplete: BTreeMap<MissingField, usize>,

    /// Records still awaiting screening
    pub unscreened: usize,

    /// `included_title` + `excluded_title`
    pub screened_count: usize,

    /// `excluded_title`
    pub excluded_at_title: usize,

    /// `included_title`
    pub sought_full_text: usize,

    /// `excluded_fulltext`
    pub excluded_full_text: usize,

    /// Full-text exclusions by reason: catalog order, then free text lexically
    pub exclusion_reasons: Vec<ReasonCount>,

    /// `included_final`
    pub included_final: usize,
}

impl CountReport {
    /// Total pre-screening removals across all fields
    pub fn removed_total(&self) -> usize {
        self.removed_incomplete.values().sum()
    }

    /// Sum over every status bucket
    pub fn bucket_total(&self) -> usize {
        self.duplicates_removed
            + self.removed_total()
            + self.unscreened
            + self.screened_count
            + self.included_final
            + self.excluded_full_text
    }

    /// Whether the buckets account for every identified record
    pub fn is_reconciled(&self) -> bool {
        self.bucket_total() == self.identified
            && self.exclusion_reasons.iter().map(|r| r.count).sum::<usize>() == self.excluded_full_text
    }

    /// Records with a decision still outstanding
    pub fn pending(&self) -> usize {
        self.unscreened + self.sought_full_text
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Flow Counts".to_string(),
            "===========".to_string(),
            format!("Identified: {}", self.identified),
        ];

        for (source, count) in &self.identified_by_source {
            let label = if source.is_empty() { "(no source)" } else { source.as_str() };
            lines.push(format!("  {}: {}", label, count));
        }

        lines.push(format!("Duplicates removed: {}", self.duplicates_removed));
        lines.push(format!("Removed as incomplete: {}", self.removed_total()));
        for (field, count) in self.removed_incomplete.iter().filter(|(_, c)| **c > 0) {
            lines.push(format!("  {}: {}", field.label(), count));
        }
        lines.push(format!("Awaiting screening: {}", self.unscreened));
        lines.push(format!("Screened: {}", self.screened_count));
        lines.push(format!("  Excluded at title/abstract: {}", self.excluded_at_title));
        lines.push(format!("  Sought for full text: {}", self.sought_full_text));
        lines.push(format!("Excluded at full text: {}", self.excluded_full_text));
        for reason in &self.exclusion_reasons {
            lines.push(format!("  {}: {}", reason.reason, reason.count));
        }
        lines.push(format!("Included: {}", self.included_final));

        lines.join("\n")
    }
}

/// Computes [`CountReport`]s against an exclusion catalog
///
/// Pure and idempotent: the same records always give the same report.
#[derive(Debug, Clone, Copy)]
pub struct FlowCounter<'a> {
    catalog: &'a ExclusionCatalog,
}

impl<'a> FlowCounter<'a> {
    /// Counter ordering reasons by `catalog`
    pub fn new(catalog: &'a ExclusionCatalog) -> Self {
        Self { catalog }
    }

    /// Counter using the project's own catalog
    pub fn for_state(state: &'a ProjectWorkflowState) -> Self {
        Self::new(state.catalog())
    }

    /// Count `records`
    pub fn compute<'r, I>(&self, records: I) -> CountReport
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut report = CountReport {
            removed_incomplete: MissingField::ALL.into_iter().map(|f| (f, 0)).collect(),
            ..Default::default()
        };
        let mut catalog_counts = vec![0usize; self.catalog.entries().len()];
        let mut free_text: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            report.identified += 1;
            *report.identified_by_source.entry(record.source.trim().to_string()).or_insert(0) += 1;

            match record.status() {
                RecordStatus::Unscreened => report.unscreened += 1,
                RecordStatus::Duplicate => report.duplicates_removed += 1,
                RecordStatus::RemovedWithout(field) => {
                    *report.removed_incomplete.entry(*field).or_insert(0) += 1;
                }
                RecordStatus::IncludedTitle => {
                    report.screened_count += 1;
                    report.sought_full_text += 1;
                }
                RecordStatus::ExcludedTitle => {
                    report.screened_count += 1;
                    report.excluded_at_title += 1;
                }
                RecordStatus::IncludedFinal => report.included_final += 1,
                RecordStatus::ExcludedFullText(reason) => {
                    report.excluded_full_text += 1;
                    match self.catalog.position(reason.as_str()) {
                        Some(index) => catalog_counts[index] += 1,
                        None => *free_text.entry(reason.as_str().to_string()).or_insert(0) += 1,
                    }
                }
            }
        }

        report.exclusion_reasons = self
            .catalog
            .entries()
            .iter()
            .zip(catalog_counts)
            .filter(|(_, count)| *count > 0)
            .map(|(reason, count)| ReasonCount {
                reason: reason.clone(),
                count,
                catalog: true,
            })
            .chain(free_text.into_iter().map(|(reason, count)| ReasonCount {
                reason,
                count,
                catalog: false,
            }))
            .collect();

        report
    }
}

/// Count `records` with no catalog; every reason is treated as free text
pub fn compute_counts<'r, I>(records: I) -> CountReport
where
    I: IntoIterator<Item = &'r Record>,
{
    let catalog = ExclusionCatalog::default();
    FlowCounter::new(&catalog).compute(records)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use prisma_domain::{ExclusionReason, StatusTag};
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = RecordStatus> {
        (0..StatusTag::ALL.len(), "[a-c]{1,2}").prop_map(|(index, reason)| {
            match StatusTag::ALL[index] {
                StatusTag::ExcludedFullText => {
                    RecordStatus::ExcludedFullText(ExclusionReason::new(reason).unwrap())
                }
                tag => RecordStatus::from_parts(tag, None).unwrap(),
            }
        })
    }

    proptest! {
        #[test]
        fn test_buckets_always_reconcile(statuses in prop::collection::vec(status_strategy(), 0..60)) {
            let records: Vec<Record> = statuses
                .into_iter()
                .enumerate()
                .map(|(i, status)| Record::new(i.to_string(), "t").with_status(status))
                .collect();

            let catalog = ExclusionCatalog::new(["a", "b"]);
            let report = FlowCounter::new(&catalog).compute(&records);
            prop_assert_eq!(report.identified, records.len());
            prop_assert!(report.is_reconciled());
        }
    }
}
