//! Extraction ledger - numeric rows keyed by record

use crate::WorkflowError;
use indexmap::IndexMap;
use prisma_domain::{ExtractionRow, RawExtractionRow, Record, RecordId, StatusTag};
use serde::{Deserialize, Serialize};

/// One ledger row together with the record it describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionEntry {
    /// Record the row belongs to
    pub record_id: RecordId,
    /// Study label (record title)
    pub label: String,
    /// Numeric values
    pub row: ExtractionRow,
}

/// Keyed store of extraction rows
///
/// Rows are validated on the way in; the ledger itself performs no
/// computation and is handed wholesale to the statistics collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionLedger {
    rows: IndexMap<RecordId, ExtractionRow>,
}

impl ExtractionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a typed row, replacing any previous one
    ///
    /// Returns the replaced row.
    pub fn set_row(
        &mut self,
        record_id: RecordId,
        row: ExtractionRow,
    ) -> Result<Option<ExtractionRow>, WorkflowError> {
        row.validate()?;
        Ok(self.rows.insert(record_id, row))
    }

    /// Parse and store a row typed as text
    ///
    /// Nothing is stored when any value fails to parse.
    pub fn set_raw_row(
        &mut self,
        record_id: RecordId,
        raw: &RawExtractionRow,
    ) -> Result<Option<ExtractionRow>, WorkflowError> {
        let row = ExtractionRow::parse(raw)?;
        Ok(self.rows.insert(record_id, row))
    }

    /// Row for a record
    pub fn get(&self, record_id: &str) -> Option<&ExtractionRow> {
        self.rows.get(record_id)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of records currently in `status`, in record order
    ///
    /// Records in that status without a row are skipped.
    pub fn rows_for<'a, I>(&self, records: I, status: StatusTag) -> Vec<ExtractionEntry>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|record| record.status().tag() == status)
            .filter_map(|record| {
                self.rows.get(&record.id).map(|row| ExtractionEntry {
                    record_id: record.id.clone(),
                    label: record.title.trim().to_string(),
                    row: *row,
                })
            })
            .collect()
    }
}
