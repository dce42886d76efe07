//! PrismaFlow Workflow
//!
//! The review state machine and everything derived from it.
//!
//! # Overview
//!
//! The workflow crate is responsible for:
//! - **Status transitions**: the [`WorkflowEngine`] is the single mutation
//!   authority over a [`ProjectWorkflowState`]
//! - **Deduplication**: insertion-ordered fuzzy title matching
//! - **Completeness removal**: dropping records that lack a required field
//!   before screening
//! - **Flow counts**: PRISMA-style aggregates that always reconcile with the
//!   record set
//! - **Extraction ledger**: numeric rows handed to the statistics collaborator
//!
//! # Flow
//!
//! ```text
//! ingest → mark_duplicates → remove_incomplete → screen_* → eligibility_* → counts
//! ```
//!
//! # Usage
//!
//! ```
//! use prisma_domain::{Candidate, StatusTag};
//! use prisma_workflow::{FlowCounter, ProjectWorkflowState, WorkflowEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::default_config();
//! let mut state = ProjectWorkflowState::new("metformin-review", engine.config());
//!
//! engine.ingest_records(&mut state, vec![
//!     Candidate::titled("Metformin and CVD Risk"),
//!     Candidate::titled("Metformin and CVD Risk"),
//! ])?;
//!
//! let outcome = engine.mark_duplicates(&mut state);
//! assert_eq!(outcome.matches.len(), 1);
//!
//! let first = state.next_with_status(StatusTag::Unscreened).unwrap().id.clone();
//! engine.screen_include(&mut state, first.as_str())?;
//! engine.eligibility_exclude(&mut state, first.as_str(), "Poor methodology")?;
//!
//! let counts = FlowCounter::for_state(&state).compute(state.records());
//! assert_eq!(counts.identified, 2);
//! assert!(counts.is_reconciled());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! duplicate_threshold = 0.95
//! exclusion_reasons = ["No comparative data", "Inadequate study design"]
//! completeness_fields = ["title", "abstract"]
//! ```

#![warn(missing_docs)]

mod completeness;
mod config;
mod counts;
mod dedup;
mod engine;
mod error;
mod ledger;
pub mod similarity;
mod state;

pub use completeness::FieldCompletenessFilter;
pub use config::WorkflowConfig;
pub use counts::{compute_counts, CountReport, FlowCounter, ReasonCount};
pub use dedup::{Deduplicator, DuplicateMatch, MatchRule};
pub use engine::{DedupOutcome, Operation, StatusChange, WorkflowEngine};
pub use error::WorkflowError;
pub use ledger::{ExtractionEntry, ExtractionLedger};
pub use similarity::similarity;
pub use state::{ExclusionCatalog, ProjectWorkflowState};
