//! Workflow engine - the review state machine
//!
//! Every mutation of a [`ProjectWorkflowState`] goes through here. Each
//! operation is all-or-nothing and returns the status changes it committed,
//! so callers can sequence persistence after the local transition.

use crate::completeness::FieldCompletenessFilter;
use crate::dedup::{Deduplicator, DuplicateMatch};
use crate::{ProjectWorkflowState, WorkflowConfig, WorkflowError};
use prisma_domain::{
    Candidate, ExclusionReason, ExtractionRow, MissingField, RawExtractionRow, Record, RecordId,
    RecordStatus, StatusTag,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Single-record decision operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Title/abstract include
    ScreenInclude,
    /// Title/abstract exclude
    ScreenExclude,
    /// Full-text include
    EligibilityInclude,
    /// Full-text exclude with reason
    EligibilityExclude,
}

impl Operation {
    /// Status the operation requires
    pub fn precondition(&self) -> StatusTag {
        match self {
            Operation::ScreenInclude | Operation::ScreenExclude => StatusTag::Unscreened,
            Operation::EligibilityInclude | Operation::EligibilityExclude => StatusTag::IncludedTitle,
        }
    }

    /// Operation name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ScreenInclude => "screen_include",
            Operation::ScreenExclude => "screen_exclude",
            Operation::EligibilityInclude => "eligibility_include",
            Operation::EligibilityExclude => "eligibility_exclude",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Record that moved
    pub record_id: RecordId,
    /// Status before the transition
    pub from: StatusTag,
    /// Status after the transition
    pub to: StatusTag,
    /// Reason persisted with the new status, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusChange {
    fn new(record_id: RecordId, from: StatusTag, to: &RecordStatus) -> Self {
        Self {
            record_id,
            from,
            to: to.tag(),
            reason: to.stored_reason().map(str::to_string),
        }
    }
}

/// Result of a deduplication pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupOutcome {
    /// Evidence for every record marked, in candidate order
    pub matches: Vec<DuplicateMatch>,
    /// Committed transitions
    pub changes: Vec<StatusChange>,
}

/// The review state machine
///
/// States: `unscreened` → `included_title` | `excluded_title` |
/// `duplicate` | `removed_without_*`; `included_title` →
/// `included_final` | `excluded_fulltext`. `duplicate`, removals,
/// `included_final` and `excluded_fulltext` are terminal.
///
/// The engine holds only configuration; state is passed in explicitly.
///
/// # Examples
///
/// ```
/// use prisma_domain::Candidate;
/// use prisma_workflow::{ProjectWorkflowState, WorkflowEngine, WorkflowError};
///
/// let engine = WorkflowEngine::default_config();
/// let mut state = ProjectWorkflowState::new("p", engine.config());
/// let ids = engine
///     .ingest_records(&mut state, vec![Candidate::titled("Metformin Effects")])
///     .unwrap();
///
/// // Eligibility before screening is rejected and nothing changes
/// let err = engine.eligibility_include(&mut state, ids[0].as_str()).unwrap_err();
/// assert!(matches!(err, WorkflowError::PreconditionFailed { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    config: WorkflowConfig,
    deduplicator: Deduplicator,
}

impl WorkflowEngine {
    /// Create an engine with the given configuration
    ///
    /// Fails with [`WorkflowError::Config`] if the configuration does not
    /// validate, e.g. a threshold outside (0, 1] or NaN.
    pub fn new(config: WorkflowConfig) -> Result<Self, WorkflowError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Create an engine with default configuration
    pub fn default_config() -> Self {
        Self::from_valid(WorkflowConfig::default())
    }

    fn from_valid(config: WorkflowConfig) -> Self {
        let deduplicator = Deduplicator::new(config.duplicate_threshold);
        Self { config, deduplicator }
    }

    /// Configuration in use
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Append search candidates as `unscreened` records
    ///
    /// Candidates without an id get one. If any id already exists in the
    /// project (or twice in the batch) nothing is ingested.
    pub fn ingest_records(
        &self,
        state: &mut ProjectWorkflowState,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<RecordId>, WorkflowError> {
        let records: Vec<Record> = candidates.into_iter().map(Record::from_candidate).collect();
        self.check_new_ids(state, &records)?;

        let ids: Vec<RecordId> = records.iter().map(|r| r.id.clone()).collect();
        for record in records {
            state.insert(record);
        }

        info!(
            "Ingested {} records into project '{}' ({} total)",
            ids.len(),
            state.project_id(),
            state.len()
        );
        Ok(ids)
    }

    /// Append records loaded from persisted storage, keeping their status
    ///
    /// Same id rules as [`Self::ingest_records`].
    pub fn restore_records(
        &self,
        state: &mut ProjectWorkflowState,
        records: Vec<Record>,
    ) -> Result<usize, WorkflowError> {
        self.check_new_ids(state, &records)?;
        let count = records.len();
        for record in records {
            state.insert(record);
        }

        info!("Restored {} records into project '{}'", count, state.project_id());
        Ok(count)
    }

    /// Mark later duplicates of earlier records
    ///
    /// Only non-terminal records are candidates. Running it again without
    /// new records changes nothing.
    pub fn mark_duplicates(&self, state: &mut ProjectWorkflowState) -> DedupOutcome {
        let matches = self.deduplicator.find_duplicates(state.records());
        let mut changes = Vec::with_capacity(matches.len());

        for found in &matches {
            if let Some(record) = state.record_mut(found.duplicate.as_str()) {
                let from = record.status().tag();
                record.set_status(RecordStatus::Duplicate);
                debug!(
                    "Marked {} duplicate of {} ({:?}, similarity {:.3})",
                    found.duplicate, found.canonical, found.rule, found.similarity
                );
                changes.push(StatusChange::new(found.duplicate.clone(), from, record.status()));
            }
        }

        info!(
            "Deduplication marked {} of {} records in project '{}'",
            changes.len(),
            state.len(),
            state.project_id()
        );
        DedupOutcome { matches, changes }
    }

    /// Remove every non-terminal record lacking `field`
    ///
    /// Records already removed are not re-evaluated, so a second call with
    /// the same field returns no changes.
    pub fn remove_incomplete(
        &self,
        state: &mut ProjectWorkflowState,
        field: MissingField,
    ) -> Vec<StatusChange> {
        let target = RecordStatus::RemovedWithout(field);
        let selected: Vec<RecordId> = FieldCompletenessFilter::select(state.records(), field)
            .map(|record| record.id.clone())
            .collect();
        let mut changes = Vec::with_capacity(selected.len());

        for id in selected {
            if let Some(record) = state.record_mut(id.as_str()) {
                let from = record.status().tag();
                record.set_status(target.clone());
                changes.push(StatusChange::new(id, from, &target));
            }
        }

        info!(
            "Removed {} records without {} from project '{}'",
            changes.len(),
            field,
            state.project_id()
        );
        changes
    }

    /// Apply every configured completeness rule in order
    pub fn apply_completeness_rules(&self, state: &mut ProjectWorkflowState) -> Vec<StatusChange> {
        self.config
            .completeness_fields
            .iter()
            .flat_map(|field| self.remove_incomplete(state, *field))
            .collect()
    }

    /// `unscreened` → `included_title`
    pub fn screen_include(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
    ) -> Result<StatusChange, WorkflowError> {
        self.transition(state, id, Operation::ScreenInclude, RecordStatus::IncludedTitle)
    }

    /// `unscreened` → `excluded_title`
    pub fn screen_exclude(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
    ) -> Result<StatusChange, WorkflowError> {
        self.transition(state, id, Operation::ScreenExclude, RecordStatus::ExcludedTitle)
    }

    /// `included_title` → `included_final`
    pub fn eligibility_include(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
    ) -> Result<StatusChange, WorkflowError> {
        self.transition(state, id, Operation::EligibilityInclude, RecordStatus::IncludedFinal)
    }

    /// `included_title` → `excluded_fulltext` with a mandatory reason
    ///
    /// A reason matching a catalog entry (case-insensitively) is stored with
    /// the catalog spelling; anything else is kept as free text.
    pub fn eligibility_exclude(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
        reason: &str,
    ) -> Result<StatusChange, WorkflowError> {
        let reason = match state.catalog().canonical(reason) {
            Some(entry) => entry.to_string(),
            None => {
                if !reason.trim().is_empty() {
                    debug!("Free-text exclusion reason for {}: {}", id, reason.trim());
                }
                reason.to_string()
            }
        };
        let reason = ExclusionReason::new(reason).map_err(|_| WorkflowError::EmptyReason)?;

        self.transition(
            state,
            id,
            Operation::EligibilityExclude,
            RecordStatus::ExcludedFullText(reason),
        )
    }

    /// Store a typed extraction row for an existing record
    pub fn set_extraction_row(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
        row: ExtractionRow,
    ) -> Result<(), WorkflowError> {
        let record_id = self.existing_id(state, id)?;
        state.ledger_mut().set_row(record_id, row)?;
        debug!("Stored extraction row for {}", id);
        Ok(())
    }

    /// Parse and store an extraction row typed as text
    pub fn set_raw_extraction_row(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
        raw: &RawExtractionRow,
    ) -> Result<(), WorkflowError> {
        let record_id = self.existing_id(state, id)?;
        state.ledger_mut().set_raw_row(record_id, raw)?;
        debug!("Stored extraction row for {}", id);
        Ok(())
    }

    fn transition(
        &self,
        state: &mut ProjectWorkflowState,
        id: &str,
        operation: Operation,
        to: RecordStatus,
    ) -> Result<StatusChange, WorkflowError> {
        let record = state
            .record_mut(id)
            .ok_or_else(|| WorkflowError::UnknownRecord(RecordId::new(id)))?;

        let from = record.status().tag();
        let expected = operation.precondition();
        if from != expected {
            return Err(WorkflowError::PreconditionFailed {
                operation,
                id: record.id.clone(),
                expected,
                actual: from,
            });
        }

        let change = StatusChange::new(record.id.clone(), from, &to);
        record.set_status(to);
        debug!("{}: {} {} -> {}", operation, change.record_id, change.from, change.to);
        Ok(change)
    }

    fn existing_id(&self, state: &ProjectWorkflowState, id: &str) -> Result<RecordId, WorkflowError> {
        state
            .record(id)
            .map(|r| r.id.clone())
            .ok_or_else(|| WorkflowError::UnknownRecord(RecordId::new(id)))
    }

    fn check_new_ids(&self, state: &ProjectWorkflowState, records: &[Record]) -> Result<(), WorkflowError> {
        let mut batch = HashSet::with_capacity(records.len());
        for record in records {
            if state.contains(record.id.as_str()) || !batch.insert(record.id.as_str()) {
                return Err(WorkflowError::DuplicateId(record.id.clone()));
            }
        }
        Ok(())
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::default_config()
    }
}
