//! Review session - local state plus its collaborators

use crate::reconcile::{reconcile, ReconcileReport};
use crate::{
    AnalysisOutcome, DispatchSummary, RecordStore, Result, SearchProvider, SearchStrategies,
    StatisticsEngine, StatusDispatcher, SyncConfig, SyncError,
};
use prisma_domain::{ExtractionRow, MissingField, RecordId, StatusTag};
use prisma_workflow::{
    CountReport, DedupOutcome, FlowCounter, ProjectWorkflowState, StatusChange, WorkflowEngine,
};
use std::sync::Arc;

/// The collaborators a session talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Literature search
    pub search: Arc<dyn SearchProvider>,
    /// Meta-analysis
    pub statistics: Arc<dyn StatisticsEngine>,
    /// Remote record storage
    pub store: Arc<dyn RecordStore>,
}

/// Coordinates one review project
///
/// Local transitions run synchronously through the [`WorkflowEngine`];
/// every committed change is then handed to the [`StatusDispatcher`]
/// without waiting for the store.
///
/// # Examples
///
/// ```
/// use prisma_sync::{
///     Collaborators, MemoryRecordStore, RecordingStatistics, ReviewSession, SearchStrategies,
///     StaticSearchProvider, SyncConfig,
/// };
/// use prisma_workflow::WorkflowEngine;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let collaborators = Collaborators {
///         search: Arc::new(StaticSearchProvider::with_metformin_fixtures()),
///         statistics: Arc::new(RecordingStatistics::default()),
///         store: Arc::new(MemoryRecordStore::new()),
///     };
///     let mut session = ReviewSession::new(
///         WorkflowEngine::default_config(),
///         SyncConfig::for_project("metformin"),
///         collaborators,
///     )?;
///
///     let strategies = SearchStrategies {
///         pubmed: "metformin AND diabetes".to_string(),
///         ..Default::default()
///     };
///     let ids = session.search_and_ingest(&strategies).await?;
///     assert_eq!(ids.len(), 3);
///
///     session.flush().await;
///     Ok(())
/// }
/// ```
pub struct ReviewSession {
    state: ProjectWorkflowState,
    engine: WorkflowEngine,
    config: SyncConfig,
    collaborators: Collaborators,
    dispatcher: StatusDispatcher,
}

impl ReviewSession {
    /// Session over an empty project
    pub fn new(engine: WorkflowEngine, config: SyncConfig, collaborators: Collaborators) -> Result<Self> {
        let state = ProjectWorkflowState::new(config.project_id.clone(), engine.config());
        Self::with_state(engine, config, collaborators, state)
    }

    /// Session over an existing project state
    pub fn with_state(
        engine: WorkflowEngine,
        config: SyncConfig,
        collaborators: Collaborators,
        state: ProjectWorkflowState,
    ) -> Result<Self> {
        config.validate()?;
        if state.project_id() != config.project_id {
            return Err(SyncError::Config(format!(
                "state belongs to project '{}', config names '{}'",
                state.project_id(),
                config.project_id
            )));
        }

        let store = Arc::clone(&collaborators.store);
        let dispatcher = if config.persist_status_changes {
            StatusDispatcher::new(store)
        } else {
            StatusDispatcher::disabled(store)
        };

        Ok(Self {
            state,
            engine,
            config,
            collaborators,
            dispatcher,
        })
    }

    /// Session restored from the record store
    pub async fn open(engine: WorkflowEngine, config: SyncConfig, collaborators: Collaborators) -> Result<Self> {
        let records = collaborators
            .store
            .load(&config.project_id)
            .await
            .map_err(SyncError::Store)?;

        let mut session = Self::new(engine, config, collaborators)?;
        let count = session.engine.restore_records(&mut session.state, records)?;
        tracing::info!("Opened project '{}' with {} records", session.config.project_id, count);
        Ok(session)
    }

    /// Current project state
    pub fn state(&self) -> &ProjectWorkflowState {
        &self.state
    }

    /// Engine in use
    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Session configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Give the state back, dropping collaborators
    pub fn into_state(self) -> ProjectWorkflowState {
        self.state
    }

    /// Query every enabled source with a strategy and ingest the results
    ///
    /// Sources with a blank strategy are skipped; results are aggregated in
    /// source order. A failing source aborts the whole search and nothing is
    /// ingested.
    pub async fn search_and_ingest(&mut self, strategies: &SearchStrategies) -> Result<Vec<RecordId>> {
        strategies
            .validate(&self.config.enabled_sources)
            .map_err(SyncError::Search)?;

        let mut candidates = Vec::new();
        for (source, strategy) in strategies.active(&self.config.enabled_sources) {
            let found = self
                .collaborators
                .search
                .search(strategy, &[source])
                .await
                .map_err(SyncError::Search)?;
            tracing::info!("{}: {} articles", source, found.len());
            candidates.extend(found);
        }

        let ids = self.engine.ingest_records(&mut self.state, candidates)?;
        self.dispatcher
            .dispatch_save(self.state.project_id(), self.state.records().cloned().collect());
        Ok(ids)
    }

    /// Mark duplicates and persist the changes
    pub fn mark_duplicates(&mut self) -> DedupOutcome {
        let outcome = self.engine.mark_duplicates(&mut self.state);
        self.dispatcher.dispatch(&outcome.changes);
        outcome
    }

    /// Remove records lacking `field` and persist the changes
    pub fn remove_incomplete(&mut self, field: MissingField) -> Vec<StatusChange> {
        let changes = self.engine.remove_incomplete(&mut self.state, field);
        self.dispatcher.dispatch(&changes);
        changes
    }

    /// `unscreened` → `included_title`
    pub fn screen_include(&mut self, id: &str) -> Result<StatusChange> {
        let change = self.engine.screen_include(&mut self.state, id)?;
        Ok(self.committed(change))
    }

    /// `unscreened` → `excluded_title`
    pub fn screen_exclude(&mut self, id: &str) -> Result<StatusChange> {
        let change = self.engine.screen_exclude(&mut self.state, id)?;
        Ok(self.committed(change))
    }

    /// `included_title` → `included_final`
    pub fn eligibility_include(&mut self, id: &str) -> Result<StatusChange> {
        let change = self.engine.eligibility_include(&mut self.state, id)?;
        Ok(self.committed(change))
    }

    /// `included_title` → `excluded_fulltext`
    pub fn eligibility_exclude(&mut self, id: &str, reason: &str) -> Result<StatusChange> {
        let change = self.engine.eligibility_exclude(&mut self.state, id, reason)?;
        Ok(self.committed(change))
    }

    /// Store an extraction row
    pub fn set_extraction_row(&mut self, id: &str, row: ExtractionRow) -> Result<()> {
        self.engine.set_extraction_row(&mut self.state, id, row)?;
        Ok(())
    }

    /// Current flow counts
    pub fn counts(&self) -> CountReport {
        FlowCounter::for_state(&self.state).compute(self.state.records())
    }

    /// Send the included studies' rows to the statistics collaborator
    pub async fn analyze(&self) -> Result<AnalysisOutcome> {
        let rows = self
            .state
            .ledger()
            .rows_for(self.state.records(), StatusTag::IncludedFinal);
        tracing::info!("Requesting analysis of {} studies", rows.len());

        self.collaborators
            .statistics
            .analyze(&rows)
            .await
            .map_err(SyncError::Statistics)
    }

    /// Merge the stored records into local state and re-push stale ones
    pub async fn reconcile(&mut self) -> Result<ReconcileReport> {
        let remote = self
            .collaborators
            .store
            .load(&self.config.project_id)
            .await
            .map_err(SyncError::Store)?;

        let report = reconcile(&self.engine, &mut self.state, remote)?;
        self.dispatcher.dispatch(&report.stale_remote);
        Ok(report)
    }

    /// Delete the project remotely and start over locally
    pub async fn reset(&mut self) -> Result<()> {
        self.dispatcher.flush().await;
        self.collaborators
            .store
            .delete_all(&self.config.project_id)
            .await
            .map_err(SyncError::Store)?;

        self.state = ProjectWorkflowState::with_catalog(self.config.project_id.clone(), self.state.catalog().clone());
        tracing::info!("Reset project '{}'", self.config.project_id);
        Ok(())
    }

    /// Wait for outstanding persistence tasks
    pub async fn flush(&mut self) -> DispatchSummary {
        let summary = self.dispatcher.flush().await;
        if summary.failed > 0 {
            tracing::warn!("{} persistence calls failed", summary.failed);
        }
        summary
    }

    fn committed(&mut self, change: StatusChange) -> StatusChange {
        self.dispatcher.dispatch(std::slice::from_ref(&change));
        change
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("project_id", &self.config.project_id)
            .field("records", &self.state.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
