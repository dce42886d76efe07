//! PrismaFlow Domain Layer
//!
//! This crate contains the data model shared by every other PrismaFlow crate.
//! It carries no workflow logic: the value objects defined here are moved
//! between states exclusively by the `prisma-workflow` engine.
//!
//! ## Key Concepts
//!
//! - **Record**: one candidate study found during identification
//! - **Status**: the closed set of review stages a record can occupy
//! - **Authors**: author names, accepted either as a list or a delimited string
//! - **Extraction row**: per-study numeric data for the statistics collaborator
//!
//! ## Status Lifecycle
//!
//! ```text
//! unscreened ──► included_title ──► included_final
//!     │                │
//!     │                └──────────► excluded_fulltext (reason required)
//!     ├──► excluded_title
//!     ├──► duplicate
//!     └──► removed_without_{title,authors,year,url,abstract}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authors;
pub mod error;
pub mod extraction;
pub mod record;
pub mod status;

// Re-exports for convenience
pub use authors::Authors;
pub use error::DomainError;
pub use extraction::{ExtractionField, ExtractionRow, RawExtractionRow};
pub use record::{Candidate, Record, RecordId};
pub use status::{ExclusionReason, MissingField, RecordStatus, StatusTag};
