//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::state_file::StateFile;
use prisma_domain::{Candidate, RecordId};
use prisma_export::delimited;
use prisma_sync::{
    Collaborators, MemoryRecordStore, RecordingStatistics, ReviewSession, SearchStrategies,
    StaticSearchProvider,
};
use prisma_workflow::WorkflowEngine;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Execute the ingest command.
pub async fn execute_ingest(
    args: IngestArgs,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let ids = if args.search {
        let strategies = SearchStrategies {
            pubmed: args.pubmed.unwrap_or_default(),
            semantic_scholar: args.semantic_scholar.unwrap_or_default(),
            arxiv: args.arxiv.unwrap_or_default(),
        };
        ingest_from_search(&strategies, state_file, engine, config).await?
    } else if let Some(path) = args.file {
        let candidates = read_candidates(&path)?;
        let mut state = state_file.load()?;
        let ids = engine.ingest_records(&mut state, candidates)?;
        state_file.save(&state)?;
        ids
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --file or --search".to_string(),
        ));
    };

    println!("{}", formatter.bulk_result("Ingested", ids.len()));
    Ok(())
}

/// Run a search against the demonstration sources and ingest the results.
async fn ingest_from_search(
    strategies: &SearchStrategies,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    config: &Config,
) -> Result<Vec<RecordId>> {
    let state = state_file.load()?;
    let sync = config.sync_for(state.project_id());
    let collaborators = Collaborators {
        search: Arc::new(StaticSearchProvider::with_metformin_fixtures()),
        statistics: Arc::new(RecordingStatistics::default()),
        store: Arc::new(MemoryRecordStore::new()),
    };

    let mut session = ReviewSession::with_state(engine.clone(), sync, collaborators, state)?;
    let ids = session.search_and_ingest(strategies).await?;
    session.flush().await;

    state_file.save(&session.into_state())?;
    Ok(ids)
}

/// Read candidates from a JSON array or, for `.csv` files, a delimited table.
pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let contents = fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let candidates = if is_csv {
        delimited::parse_records(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    tracing::info!("Read {} candidates from {}", candidates.len(), path.display());
    Ok(candidates)
}
