//! Record module - one candidate study under review

use crate::{Authors, DomainError, RecordStatus, StatusTag};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a record within a project
///
/// Provider ids (`"pubmed_1"`) are kept as-is; records arriving without
/// one get a UUIDv7 string at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUIDv7-based identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use prisma_domain::RecordId;
    ///
    /// let id = RecordId::generate();
    /// assert_eq!(id.as_str().len(), 36);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A search result before ingestion: descriptive fields only, no status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Provider identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Title
    #[serde(default)]
    pub title: String,

    /// Author names
    #[serde(default)]
    pub authors: Authors,

    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,

    /// Origin database tag
    #[serde(default)]
    pub source: String,

    /// Abstract text
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Link to the record
    #[serde(default)]
    pub url: String,
}

impl Candidate {
    /// Create a candidate with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// One candidate study tracked through the review
///
/// Descriptive fields are free-form; `status` is only changed through the
/// workflow engine, which owns the record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr", into = "RecordRepr")]
pub struct Record {
    /// Unique identifier within the project
    pub id: RecordId,

    /// Title (blank counts as missing)
    pub title: String,

    /// Author names
    pub authors: Authors,

    /// Publication year
    pub year: Option<i32>,

    /// Origin database tag
    pub source: String,

    /// Abstract text
    pub abstract_text: String,

    /// Link to the record
    pub url: String,

    status: RecordStatus,
}

impl Record {
    /// Create an unscreened record from a candidate
    ///
    /// The candidate's id is kept when present and non-blank, otherwise a
    /// new one is generated.
    pub fn from_candidate(candidate: Candidate) -> Self {
        let id = candidate
            .id
            .filter(|id| !id.trim().is_empty())
            .map(RecordId::new)
            .unwrap_or_else(RecordId::generate);

        Self {
            id,
            title: candidate.title,
            authors: candidate.authors,
            year: candidate.year,
            source: candidate.source,
            abstract_text: candidate.abstract_text,
            url: candidate.url,
            status: RecordStatus::Unscreened,
        }
    }

    /// Create an unscreened record with the given id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::from_candidate(Candidate {
            id: Some(id.into()),
            title: title.into(),
            ..Default::default()
        })
    }

    /// Builder: set authors
    pub fn with_authors(mut self, authors: impl Into<Authors>) -> Self {
        self.authors = authors.into();
        self
    }

    /// Builder: set year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Builder: set source tag
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Builder: set abstract
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    /// Builder: set url
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder: set status (restoring persisted records)
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Current status
    pub fn status(&self) -> &RecordStatus {
        &self.status
    }

    /// Replace the status
    ///
    /// Legality of the transition is the caller's responsibility; the
    /// workflow engine is the only caller in this workspace.
    pub fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
    }

    /// Trimmed title, `None` when blank
    pub fn title_text(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    /// Exclusion reason derived from the status
    pub fn exclusion_reason(&self) -> Option<&str> {
        self.status.exclusion_reason()
    }
}

/// Flat wire form: status tag plus optional reason
///
/// Removals write their field label as the reason; it is ignored on read.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordRepr {
    id: RecordId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Authors,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    source: String,
    #[serde(default, rename = "abstract")]
    abstract_text: String,
    #[serde(default)]
    url: String,
    #[serde(default = "default_status")]
    status: StatusTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclusion_reason: Option<String>,
}

fn default_status() -> StatusTag {
    StatusTag::Unscreened
}

impl TryFrom<RecordRepr> for Record {
    type Error = DomainError;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        let status = RecordStatus::from_parts(repr.status, repr.exclusion_reason)?;
        Ok(Record {
            id: repr.id,
            title: repr.title,
            authors: repr.authors,
            year: repr.year,
            source: repr.source,
            abstract_text: repr.abstract_text,
            url: repr.url,
            status,
        })
    }
}

impl From<Record> for RecordRepr {
    fn from(record: Record) -> Self {
        RecordRepr {
            exclusion_reason: record.status.exclusion_reason().map(str::to_string),
            status: record.status.tag(),
            id: record.id,
            title: record.title,
            authors: record.authors,
            year: record.year,
            source: record.source,
            abstract_text: record.abstract_text,
            url: record.url,
        }
    }
}
