//! Field completeness predicates used before screening

use prisma_domain::{MissingField, Record};

/// Predicates behind `remove_incomplete`
///
/// Each predicate is evaluated on its own. Records already in a terminal
/// status (including an earlier removal) are never selected, so a record is
/// removed at most once and later passes do not recount it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCompletenessFilter;

impl FieldCompletenessFilter {
    /// Whether `record` lacks `field`
    ///
    /// - title, url, abstract: blank after trimming
    /// - authors: no non-blank name
    /// - year: absent or not positive
    pub fn is_missing(record: &Record, field: MissingField) -> bool {
        match field {
            MissingField::Title => record.title.trim().is_empty(),
            MissingField::Authors => record.authors.is_missing(),
            MissingField::Year => !matches!(record.year, Some(year) if year > 0),
            MissingField::Url => record.url.trim().is_empty(),
            MissingField::Abstract => record.abstract_text.trim().is_empty(),
        }
    }

    /// Non-terminal records lacking `field`, in insertion order
    pub fn select<'a, I>(records: I, field: MissingField) -> impl Iterator<Item = &'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(move |record| !record.status().is_terminal() && Self::is_missing(record, field))
    }
}
