//! PrismaFlow Export
//!
//! Read-only views over a review for reporting and exchange.
//!
//! # Components
//!
//! - [`delimited`]: comma-separated table of included studies, and its parser
//! - [`PrismaFigure`]: the PRISMA 2020 flow diagram numbers with coherence checks
//! - [`ReviewReport`]: JSON snapshot of counts, figure and included studies
//!
//! # Usage
//!
//! ```
//! use prisma_domain::Candidate;
//! use prisma_export::{delimited, PrismaFigure};
//! use prisma_workflow::{ProjectWorkflowState, WorkflowEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::default_config();
//! let mut state = ProjectWorkflowState::new("metformin-review", engine.config());
//! let ids = engine.ingest_records(&mut state, vec![Candidate::titled("Metformin and HbA1c")])?;
//!
//! engine.screen_include(&mut state, ids[0].as_str())?;
//! engine.eligibility_include(&mut state, ids[0].as_str())?;
//!
//! let figure = PrismaFigure::for_state(&state)?;
//! assert_eq!(figure.studies_qualitative_synthesis, 1);
//!
//! let table = delimited::write_included(state.records());
//! assert_eq!(delimited::parse_records(&table)?.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod delimited;
mod error;
mod prisma;
mod report;

pub use error::{ExportError, Result};
pub use prisma::PrismaFigure;
pub use report::{IncludedStudy, ReviewReport};
