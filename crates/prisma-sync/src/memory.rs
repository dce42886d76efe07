//! In-memory collaborators for tests, demos and offline use
//!
//! Each mock records its calls and can be told to fail.

use crate::{
    AnalysisOutcome, CollaboratorError, DraftField, DraftStore, RecordStore, SearchProvider,
    SearchSource, StatisticsEngine,
};
use async_trait::async_trait;
use prisma_domain::{Authors, Candidate, Record, RecordId, RecordStatus, StatusTag};
use prisma_workflow::ExtractionEntry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search provider answering from fixed per-source result lists
///
/// # Examples
///
/// ```
/// use prisma_sync::{SearchProvider, SearchSource, StaticSearchProvider};
///
/// #[tokio::main]
/// async fn main() {
///     let provider = StaticSearchProvider::with_metformin_fixtures();
///     let found = provider.search("metformin", &[SearchSource::ArXiv]).await.unwrap();
///     assert_eq!(found.len(), 2);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSearchProvider {
    results: Arc<Mutex<HashMap<SearchSource, Vec<Candidate>>>>,
    failing: Arc<Mutex<HashSet<SearchSource>>>,
    queries: Arc<Mutex<Vec<(SearchSource, String)>>>,
}

impl StaticSearchProvider {
    /// Provider with no results
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider seeded with the metformin demo articles
    pub fn with_metformin_fixtures() -> Self {
        let provider = Self::new();
        for source in SearchSource::ALL {
            provider.set_results(source, metformin_fixtures(source));
        }
        provider
    }

    /// Replace the results returned for `source`
    pub fn set_results(&self, source: SearchSource, candidates: Vec<Candidate>) {
        lock(&self.results).insert(source, candidates);
    }

    /// Make every search touching `source` fail
    pub fn add_error(&self, source: SearchSource) {
        lock(&self.failing).insert(source);
    }

    /// Queries received, in order
    pub fn queries(&self) -> Vec<(SearchSource, String)> {
        lock(&self.queries).clone()
    }

    /// Number of per-source queries received
    pub fn call_count(&self) -> usize {
        lock(&self.queries).len()
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn search(&self, strategy: &str, sources: &[SearchSource]) -> Result<Vec<Candidate>, CollaboratorError> {
        let mut found = Vec::new();
        for source in sources {
            lock(&self.queries).push((*source, strategy.to_string()));
            if lock(&self.failing).contains(source) {
                return Err(CollaboratorError::Unavailable(format!("{} did not respond", source)));
            }
            found.extend(lock(&self.results).get(source).cloned().unwrap_or_default());
        }
        Ok(found)
    }
}

fn fixture(id: &str, title: &str, authors: &[&str], source: SearchSource, year: i32, abstract_text: &str) -> Candidate {
    Candidate {
        id: Some(id.to_string()),
        title: title.to_string(),
        authors: Authors::list(authors.iter().copied()),
        year: Some(year),
        source: source.label().to_string(),
        abstract_text: abstract_text.to_string(),
        url: String::new(),
    }
}

/// Demo articles per source
pub fn metformin_fixtures(source: SearchSource) -> Vec<Candidate> {
    match source {
        SearchSource::PubMed => vec![
            fixture(
                "pubmed_1",
                "Metformin and Glycemic Control in Type 2 Diabetes: A Systematic Review",
                &["Smith A", "Johnson B", "Williams C"],
                source,
                2024,
                "This systematic review examines the efficacy of metformin in controlling blood glucose levels in patients with type 2 diabetes. We analyzed 45 randomized controlled trials involving 12,000 patients. Results show significant HbA1c reduction of 1.5-2.0% compared to placebo.",
            ),
            fixture(
                "pubmed_2",
                "Cardiovascular Safety of Metformin in Diabetic Patients",
                &["Brown D", "Davis E"],
                source,
                2023,
                "Long-term cardiovascular outcomes in 8,000 type 2 diabetic patients treated with metformin. No significant increase in adverse events. Mortality rates comparable to control group.",
            ),
            fixture(
                "pubmed_3",
                "Lactic Acidosis Risk with Metformin: A Meta-Analysis",
                &["Garcia F", "Martinez G", "Lopez H"],
                source,
                2023,
                "Meta-analysis of 120 studies examining lactic acidosis incidence in metformin users. Incidence rate: 0.03 cases per 1000 patient-years in patients with normal renal function.",
            ),
        ],
        SearchSource::SemanticScholar => vec![
            fixture(
                "semantic_1",
                "Metformin Mechanism of Action in Type 2 Diabetes",
                &["Chen X", "Wang Y"],
                source,
                2024,
                "Comprehensive review of metformin's molecular mechanisms including AMPK activation, mitochondrial function, and glucose metabolism pathways.",
            ),
            fixture(
                "semantic_2",
                "Efficacy Comparison: Metformin vs Other Antidiabetic Drugs",
                &["Patel R", "Kumar S", "Singh T"],
                source,
                2023,
                "Comparative analysis of metformin, sulfonylureas, and insulin in type 2 diabetes management. Metformin shows superior glycemic control with fewer hypoglycemic episodes.",
            ),
        ],
        SearchSource::ArXiv => vec![
            fixture(
                "arxiv_1",
                "Machine Learning Prediction of Metformin Response in Type 2 Diabetes",
                &["Zhang L", "Liu M", "Wu N"],
                source,
                2024,
                "Novel machine learning model predicts individual patient response to metformin therapy based on genetic and clinical parameters. Accuracy: 87%.",
            ),
            fixture(
                "arxiv_2",
                "Computational Analysis of Metformin-Protein Interactions",
                &["Park J", "Kim K"],
                source,
                2023,
                "Molecular dynamics simulations of metformin interactions with cellular proteins. Identifies key binding sites and mechanisms of action.",
            ),
        ],
    }
}

/// A status update received by [`MemoryRecordStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Record updated
    pub record_id: RecordId,
    /// New status
    pub status: StatusTag,
    /// Reason sent with it
    pub reason: Option<String>,
}

/// Record store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    projects: Arc<Mutex<HashMap<String, Vec<Record>>>>,
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
    failing: Arc<Mutex<bool>>,
    save_delay: Arc<Mutex<Option<Duration>>>,
}

impl MemoryRecordStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }

    /// Make every `save` take `delay` before it is stored
    pub fn set_save_delay(&self, delay: Duration) {
        *lock(&self.save_delay) = Some(delay);
    }

    /// Status updates received, in order
    pub fn updates(&self) -> Vec<StatusUpdate> {
        lock(&self.updates).clone()
    }

    /// Stored records of a project
    pub fn records(&self, project_id: &str) -> Vec<Record> {
        lock(&self.projects).get(project_id).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<(), CollaboratorError> {
        if *lock(&self.failing) {
            return Err(CollaboratorError::Unavailable("record store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self, project_id: &str) -> Result<Vec<Record>, CollaboratorError> {
        self.check()?;
        Ok(self.records(project_id))
    }

    async fn save(&self, project_id: &str, records: &[Record]) -> Result<(), CollaboratorError> {
        self.check()?;
        let delay = *lock(&self.save_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.projects).insert(project_id.to_string(), records.to_vec());
        Ok(())
    }

    async fn update_status(
        &self,
        record_id: &RecordId,
        status: StatusTag,
        reason: Option<&str>,
    ) -> Result<(), CollaboratorError> {
        self.check()?;
        let new_status = RecordStatus::from_parts(status, reason.map(str::to_string))
            .map_err(|e| CollaboratorError::Failed(e.to_string()))?;

        let mut projects = lock(&self.projects);
        let stored = projects
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|record| &record.id == record_id);
        if let Some(record) = stored {
            record.set_status(new_status);
        }

        lock(&self.updates).push(StatusUpdate {
            record_id: record_id.clone(),
            status,
            reason: reason.map(str::to_string),
        });
        Ok(())
    }

    async fn delete_all(&self, project_id: &str) -> Result<(), CollaboratorError> {
        self.check()?;
        lock(&self.projects).remove(project_id);
        Ok(())
    }
}

/// Statistics engine returning a fixed outcome and recording its inputs
#[derive(Debug, Clone, Default)]
pub struct RecordingStatistics {
    outcome: AnalysisOutcome,
    calls: Arc<Mutex<Vec<Vec<ExtractionEntry>>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingStatistics {
    /// Engine answering every call with `outcome`
    pub fn new(outcome: AnalysisOutcome) -> Self {
        Self {
            outcome,
            ..Default::default()
        }
    }

    /// Make every subsequent call fail
    pub fn add_error(&self) {
        *lock(&self.failing) = true;
    }

    /// Rows received by each call
    pub fn calls(&self) -> Vec<Vec<ExtractionEntry>> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl StatisticsEngine for RecordingStatistics {
    async fn analyze(&self, rows: &[ExtractionEntry]) -> Result<AnalysisOutcome, CollaboratorError> {
        lock(&self.calls).push(rows.to_vec());
        if *lock(&self.failing) {
            return Err(CollaboratorError::Failed("analysis engine error".to_string()));
        }
        if rows.is_empty() {
            return Err(CollaboratorError::InvalidRequest("no extraction rows to analyze".to_string()));
        }
        Ok(self.outcome.clone())
    }
}

/// Draft store recording every save
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    saves: Arc<Mutex<Vec<(DraftField, String)>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryDraftStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }

    /// All saves, in order
    pub fn saves(&self) -> Vec<(DraftField, String)> {
        lock(&self.saves).clone()
    }

    /// Last saved value of a field
    pub fn latest(&self, field: DraftField) -> Option<String> {
        lock(&self.saves)
            .iter()
            .rev()
            .find(|(saved, _)| *saved == field)
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save_draft(&self, _project_id: &str, field: DraftField, value: &str) -> Result<(), CollaboratorError> {
        if *lock(&self.failing) {
            return Err(CollaboratorError::Unavailable("draft store offline".to_string()));
        }
        lock(&self.saves).push((field, value.to_string()));
        Ok(())
    }
}
