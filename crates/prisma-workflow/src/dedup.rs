//! Duplicate detection over an insertion-ordered record set

use crate::similarity::{compare_normalized, normalize};
use prisma_domain::{Record, RecordId, RecordStatus, StatusTag};
use serde::Serialize;

/// Which rule identified a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Title similarity reached the configured threshold
    TitleSimilarity,
    /// Identical title, same first author and same year
    ExactTitleAuthorYear,
}

/// A later record found to duplicate an earlier canonical one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch {
    /// Record to be marked `duplicate`
    pub duplicate: RecordId,
    /// Earlier record it matched; stays canonical
    pub canonical: RecordId,
    /// Title similarity of the pair
    pub similarity: f64,
    /// Rule that fired
    pub rule: MatchRule,
}

/// Scans records in insertion order and flags later duplicates
///
/// For each candidate, earlier records are tried lowest index first and
/// the first match wins. Records already `duplicate` are never targets,
/// so the earliest member of a cluster always stays canonical. Records in
/// a terminal status are never candidates, which makes a second pass a
/// no-op. Records without a title are neither candidates nor targets.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
}

struct Entry<'a> {
    record: &'a Record,
    title: Option<String>,
    first_author: Option<String>,
    duplicate: bool,
}

impl Deduplicator {
    /// Create a deduplicator with the given similarity threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Similarity threshold in use
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Find duplicates without modifying anything
    ///
    /// Matches are returned in candidate order.
    pub fn find_duplicates<'a, I>(&self, records: I) -> Vec<DuplicateMatch>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut entries: Vec<Entry<'a>> = records
            .into_iter()
            .map(|record| Entry {
                record,
                title: record.title_text().map(normalize),
                first_author: record.authors.first().map(|a| a.to_lowercase()),
                duplicate: record.status().tag() == StatusTag::Duplicate,
            })
            .collect();

        let mut matches = Vec::new();

        for i in 0..entries.len() {
            let candidate = &entries[i];
            if candidate.record.status().is_terminal() {
                continue;
            }
            let Some(title) = candidate.title.as_deref() else {
                continue;
            };

            let found = entries[..i]
                .iter()
                .filter(|target| !target.duplicate)
                .find_map(|target| self.match_pair(candidate, title, target));

            if let Some(found) = found {
                entries[i].duplicate = true;
                matches.push(found);
            }
        }

        matches
    }

    /// Mark duplicates in an ordered list, returning the updated list
    ///
    /// Only `status` changes; order is preserved.
    pub fn mark_duplicates(&self, mut records: Vec<Record>) -> (Vec<Record>, Vec<DuplicateMatch>) {
        let matches = self.find_duplicates(records.iter());
        for found in &matches {
            if let Some(record) = records.iter_mut().find(|r| r.id == found.duplicate) {
                record.set_status(RecordStatus::Duplicate);
            }
        }
        (records, matches)
    }

    fn match_pair(&self, candidate: &Entry<'_>, title: &str, target: &Entry<'_>) -> Option<DuplicateMatch> {
        let target_title = target.title.as_deref()?;
        let score = compare_normalized(title, target_title)?;

        let rule = if score == 1.0 && same_author_and_year(candidate, target) {
            MatchRule::ExactTitleAuthorYear
        } else if score >= self.threshold {
            MatchRule::TitleSimilarity
        } else {
            return None;
        };

        Some(DuplicateMatch {
            duplicate: candidate.record.id.clone(),
            canonical: target.record.id.clone(),
            similarity: score,
            rule,
        })
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(0.95)
    }
}

fn same_author_and_year(a: &Entry<'_>, b: &Entry<'_>) -> bool {
    let authors_match = matches!(
        (&a.first_author, &b.first_author),
        (Some(x), Some(y)) if x == y
    );
    let years_match = matches!(
        (a.record.year, b.record.year),
        (Some(x), Some(y)) if x == y
    );
    authors_match && years_match
}
