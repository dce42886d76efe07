//! PrismaFlow Sync
//!
//! Asynchronous side effects around the synchronous workflow core.
//!
//! # Architecture
//!
//! Local state is always the source of truth. After a transition commits,
//! the change is pushed to the record store in a background task that the
//! next transition never waits for. Remote storage may lag; reconciliation
//! keeps the local status.
//!
//! # Components
//!
//! - Collaborator traits: [`SearchProvider`], [`StatisticsEngine`],
//!   [`RecordStore`], [`DraftStore`]
//! - [`StatusDispatcher`]: fire-and-forget persistence of status changes
//! - [`Autosaver`]: debounced saving of free-text drafts
//! - [`ReviewSession`]: state, engine and collaborators together
//! - In-memory collaborators for tests and demos

#![warn(missing_docs)]

mod autosave;
mod collaborators;
mod config;
mod dispatcher;
mod error;
pub mod memory;
mod reconcile;
mod session;

pub use autosave::Autosaver;
pub use collaborators::{
    AnalysisOutcome, DraftField, DraftStore, RecordStore, SearchProvider, SearchSource,
    SearchStrategies, StatisticsEngine,
};
pub use config::SyncConfig;
pub use dispatcher::{DispatchSummary, StatusDispatcher};
pub use error::{CollaboratorError, Result, SyncError};
pub use memory::{MemoryDraftStore, MemoryRecordStore, RecordingStatistics, StaticSearchProvider};
pub use reconcile::{reconcile, ReconcileReport};
pub use session::{Collaborators, ReviewSession};
