//! Project workflow state - the record set of one review

use crate::{ExtractionLedger, WorkflowConfig};
use indexmap::IndexMap;
use prisma_domain::{Record, RecordId, StatusTag};
use serde::{Deserialize, Serialize};

/// Ordered list of human-facing exclusion reasons
///
/// Free text outside the catalog is always accepted as the "other" escape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionCatalog(Vec<String>);

impl ExclusionCatalog {
    /// Create a catalog from reasons in display order
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            reasons
                .into_iter()
                .map(|r| r.into().trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        )
    }

    /// Reasons in display order
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Catalog spelling of `reason`, matched case-insensitively
    pub fn canonical(&self, reason: &str) -> Option<&str> {
        let reason = reason.trim();
        self.0
            .iter()
            .find(|entry| entry.to_lowercase() == reason.to_lowercase())
            .map(String::as_str)
    }

    /// Position of `reason` in the catalog
    pub fn position(&self, reason: &str) -> Option<usize> {
        let canonical = self.canonical(reason)?;
        self.0.iter().position(|entry| entry == canonical)
    }
}

/// Everything the workflow engine mutates for one review project
///
/// Records keep their insertion order, which is the deduplication
/// tie-break order. Records are never removed; exclusion is a status.
/// Mutation goes through [`crate::WorkflowEngine`] only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectWorkflowState {
    project_id: String,

    #[serde(with = "records_as_list")]
    records: IndexMap<RecordId, Record>,

    #[serde(default)]
    exclusion_catalog: ExclusionCatalog,

    #[serde(default)]
    extraction_ledger: ExtractionLedger,
}

impl ProjectWorkflowState {
    /// Create an empty project using the catalog from `config`
    pub fn new(project_id: impl Into<String>, config: &WorkflowConfig) -> Self {
        Self::with_catalog(project_id, ExclusionCatalog::new(config.exclusion_reasons.iter().cloned()))
    }

    /// Create an empty project with an explicit catalog
    pub fn with_catalog(project_id: impl Into<String>, catalog: ExclusionCatalog) -> Self {
        Self {
            project_id: project_id.into(),
            records: IndexMap::new(),
            exclusion_catalog: catalog,
            extraction_ledger: ExtractionLedger::new(),
        }
    }

    /// Project identifier
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.values()
    }

    /// Record by id
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Whether a record with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of records ever ingested
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been ingested
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records currently in `status`, in insertion order
    pub fn records_with_status(&self, status: StatusTag) -> impl Iterator<Item = &Record> + '_ {
        self.records.values().filter(move |r| r.status().tag() == status)
    }

    /// First record in `status` by insertion order
    ///
    /// The engine has no notion of a current record; this is the usual
    /// external policy for picking the next one to decide.
    pub fn next_with_status(&self, status: StatusTag) -> Option<&Record> {
        self.records_with_status(status).next()
    }

    /// Next record awaiting title/abstract screening
    pub fn next_unscreened(&self) -> Option<&Record> {
        self.next_with_status(StatusTag::Unscreened)
    }

    /// Next record awaiting full-text eligibility
    pub fn next_awaiting_eligibility(&self) -> Option<&Record> {
        self.next_with_status(StatusTag::IncludedTitle)
    }

    /// Exclusion-reason catalog
    pub fn catalog(&self) -> &ExclusionCatalog {
        &self.exclusion_catalog
    }

    /// Extraction ledger
    pub fn ledger(&self) -> &ExtractionLedger {
        &self.extraction_ledger
    }

    pub(crate) fn record_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    pub(crate) fn insert(&mut self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut ExtractionLedger {
        &mut self.extraction_ledger
    }
}

/// Serialize the record map as a plain list; ids live inside each record
mod records_as_list {
    use indexmap::IndexMap;
    use prisma_domain::{Record, RecordId};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        records: &IndexMap<RecordId, Record>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(records.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<RecordId, Record>, D::Error> {
        let list = Vec::<Record>::deserialize(deserializer)?;
        let mut records = IndexMap::with_capacity(list.len());
        for record in list {
            let id = record.id.clone();
            if records.insert(id.clone(), record).is_some() {
                return Err(D::Error::custom(format!("duplicate record id: {}", id)));
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_domain::RecordStatus;

    #[test]
    fn test_catalog_canonical() {
        let catalog = ExclusionCatalog::new(["Poor methodology", "Duplicate data", "  "]);
        assert_eq!(catalog.entries().len(), 2);
        assert_eq!(catalog.canonical(" poor METHODOLOGY"), Some("Poor methodology"));
        assert_eq!(catalog.position("duplicate data"), Some(1));
        assert_eq!(catalog.canonical("Wrong population"), None);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut state = ProjectWorkflowState::new("p", &WorkflowConfig::default());
        for id in ["z", "a", "m"] {
            state.insert(Record::new(id, id));
        }
        let order: Vec<_> = state.records().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_next_with_status() {
        let mut state = ProjectWorkflowState::new("p", &WorkflowConfig::default());
        state.insert(Record::new("a", "A").with_status(RecordStatus::IncludedTitle));
        state.insert(Record::new("b", "B"));
        state.insert(Record::new("c", "C"));
        assert_eq!(state.next_unscreened().unwrap().id.as_str(), "b");
        assert_eq!(state.next_awaiting_eligibility().unwrap().id.as_str(), "a");
        assert!(state.next_with_status(StatusTag::IncludedFinal).is_none());
    }

    #[test]
    fn test_serde_records_as_list() {
        let mut state = ProjectWorkflowState::new("p", &WorkflowConfig::default());
        state.insert(Record::new("b", "B"));
        state.insert(Record::new("a", "A"));

        let json = serde_json::to_value(&state).unwrap();
        assert!(json["records"].is_array());
        assert_eq!(json["records"][0]["id"], "b");

        let back: ProjectWorkflowState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_serde_rejects_duplicate_ids() {
        let json = r#"{"project_id": "p", "records": [{"id": "a"}, {"id": "a"}]}"#;
        assert!(serde_json::from_str::<ProjectWorkflowState>(json).is_err());
    }
}
