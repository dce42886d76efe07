//! Status module - the closed set of review stages

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Descriptive field whose absence removes a record before screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    /// Blank title
    Title,
    /// No author names
    Authors,
    /// Absent or non-positive year
    Year,
    /// Blank url
    Url,
    /// Blank abstract
    Abstract,
}

impl MissingField {
    /// Every field in reporting order
    pub const ALL: [MissingField; 5] = [
        MissingField::Title,
        MissingField::Authors,
        MissingField::Year,
        MissingField::Url,
        MissingField::Abstract,
    ];

    /// Field name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Title => "title",
            MissingField::Authors => "authors",
            MissingField::Year => "year",
            MissingField::Url => "url",
            MissingField::Abstract => "abstract",
        }
    }

    /// Human-facing label used as the implicit exclusion reason
    pub fn label(&self) -> &'static str {
        match self {
            MissingField::Title => "missing title",
            MissingField::Authors => "missing authors",
            MissingField::Year => "missing year",
            MissingField::Url => "missing url",
            MissingField::Abstract => "missing abstract",
        }
    }

    /// The removal status matching this field
    pub fn status_tag(&self) -> StatusTag {
        match self {
            MissingField::Title => StatusTag::RemovedWithoutTitle,
            MissingField::Authors => StatusTag::RemovedWithoutAuthors,
            MissingField::Year => StatusTag::RemovedWithoutYear,
            MissingField::Url => StatusTag::RemovedWithoutUrl,
            MissingField::Abstract => StatusTag::RemovedWithoutAbstract,
        }
    }

    /// Parse a predicate name
    ///
    /// Accepts the bare field name, optionally prefixed with `no ` or
    /// `missing ` (`"url"`, `"no url"`, `"missing_url"`).
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.trim().to_lowercase().replace(['_', '-'], " ");
        let name = lowered
            .strip_prefix("no ")
            .or_else(|| lowered.strip_prefix("missing "))
            .unwrap_or(&lowered)
            .trim();

        match name {
            "title" => Some(MissingField::Title),
            "authors" | "author" => Some(MissingField::Authors),
            "year" => Some(MissingField::Year),
            "url" => Some(MissingField::Url),
            "abstract" => Some(MissingField::Abstract),
            _ => None,
        }
    }
}

impl std::str::FromStr for MissingField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidField(s.to_string()))
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire representation of a status: the bare tag without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTag {
    /// Awaiting title/abstract screening
    Unscreened,
    /// Later copy of an earlier record
    Duplicate,
    /// Removed for a blank title
    RemovedWithoutTitle,
    /// Removed for missing authors
    RemovedWithoutAuthors,
    /// Removed for a missing year
    RemovedWithoutYear,
    /// Removed for a blank url
    RemovedWithoutUrl,
    /// Removed for a blank abstract
    RemovedWithoutAbstract,
    /// Passed title/abstract screening
    IncludedTitle,
    /// Rejected at title/abstract screening
    ExcludedTitle,
    /// Passed full-text eligibility
    IncludedFinal,
    /// Rejected at full-text eligibility
    #[serde(rename = "excluded_fulltext")]
    ExcludedFullText,
}

impl StatusTag {
    /// Every tag in flow order
    pub const ALL: [StatusTag; 11] = [
        StatusTag::Unscreened,
        StatusTag::Duplicate,
        StatusTag::RemovedWithoutTitle,
        StatusTag::RemovedWithoutAuthors,
        StatusTag::RemovedWithoutYear,
        StatusTag::RemovedWithoutUrl,
        StatusTag::RemovedWithoutAbstract,
        StatusTag::IncludedTitle,
        StatusTag::ExcludedTitle,
        StatusTag::IncludedFinal,
        StatusTag::ExcludedFullText,
    ];

    /// Get the tag as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::Unscreened => "unscreened",
            StatusTag::Duplicate => "duplicate",
            StatusTag::RemovedWithoutTitle => "removed_without_title",
            StatusTag::RemovedWithoutAuthors => "removed_without_authors",
            StatusTag::RemovedWithoutYear => "removed_without_year",
            StatusTag::RemovedWithoutUrl => "removed_without_url",
            StatusTag::RemovedWithoutAbstract => "removed_without_abstract",
            StatusTag::IncludedTitle => "included_title",
            StatusTag::ExcludedTitle => "excluded_title",
            StatusTag::IncludedFinal => "included_final",
            StatusTag::ExcludedFullText => "excluded_fulltext",
        }
    }

    /// Parse a tag from a string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|tag| tag.as_str().eq_ignore_ascii_case(s))
    }

    /// The missing field behind a removal tag
    pub fn missing_field(&self) -> Option<MissingField> {
        match self {
            StatusTag::RemovedWithoutTitle => Some(MissingField::Title),
            StatusTag::RemovedWithoutAuthors => Some(MissingField::Authors),
            StatusTag::RemovedWithoutYear => Some(MissingField::Year),
            StatusTag::RemovedWithoutUrl => Some(MissingField::Url),
            StatusTag::RemovedWithoutAbstract => Some(MissingField::Abstract),
            _ => None,
        }
    }

    /// No engine-driven transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatusTag::Duplicate
                | StatusTag::RemovedWithoutTitle
                | StatusTag::RemovedWithoutAuthors
                | StatusTag::RemovedWithoutYear
                | StatusTag::RemovedWithoutUrl
                | StatusTag::RemovedWithoutAbstract
                | StatusTag::IncludedFinal
                | StatusTag::ExcludedFullText
        )
    }
}

impl std::str::FromStr for StatusTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer-supplied reason for a full-text exclusion
///
/// Always non-empty; surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ExclusionReason(String);

impl ExclusionReason {
    /// Create a reason, rejecting blank text
    pub fn new(reason: impl Into<String>) -> Result<Self, DomainError> {
        let reason = reason.into();
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyExclusionReason);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The reason text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ExclusionReason {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ExclusionReason::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current stage of a record
///
/// A full-text exclusion carries its reason inside the variant, so a
/// record excluded at eligibility can never lack one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RecordStatus {
    /// Awaiting title/abstract screening
    #[default]
    Unscreened,
    /// Later copy of an earlier record
    Duplicate,
    /// Removed before screening for a missing field
    RemovedWithout(MissingField),
    /// Passed title/abstract screening
    IncludedTitle,
    /// Rejected at title/abstract screening
    ExcludedTitle,
    /// Passed full-text eligibility
    IncludedFinal,
    /// Rejected at full-text eligibility
    ExcludedFullText(ExclusionReason),
}

impl RecordStatus {
    /// Rebuild a status from its wire parts
    pub fn from_parts(tag: StatusTag, reason: Option<String>) -> Result<Self, DomainError> {
        let reason = reason.filter(|r| !r.trim().is_empty());

        match (tag, reason) {
            (StatusTag::ExcludedFullText, Some(reason)) => {
                Ok(RecordStatus::ExcludedFullText(ExclusionReason::new(reason)?))
            }
            (StatusTag::ExcludedFullText, None) => Err(DomainError::MissingExclusionReason),
            (tag, Some(_)) if tag.missing_field().is_none() => {
                Err(DomainError::UnexpectedExclusionReason(tag.to_string()))
            }
            (tag, _) => Ok(match tag {
                StatusTag::Unscreened => RecordStatus::Unscreened,
                StatusTag::Duplicate => RecordStatus::Duplicate,
                StatusTag::IncludedTitle => RecordStatus::IncludedTitle,
                StatusTag::ExcludedTitle => RecordStatus::ExcludedTitle,
                StatusTag::IncludedFinal => RecordStatus::IncludedFinal,
                other => match other.missing_field() {
                    Some(field) => RecordStatus::RemovedWithout(field),
                    None => return Err(DomainError::InvalidStatus(other.to_string())),
                },
            }),
        }
    }

    /// The bare tag of this status
    pub fn tag(&self) -> StatusTag {
        match self {
            RecordStatus::Unscreened => StatusTag::Unscreened,
            RecordStatus::Duplicate => StatusTag::Duplicate,
            RecordStatus::RemovedWithout(field) => field.status_tag(),
            RecordStatus::IncludedTitle => StatusTag::IncludedTitle,
            RecordStatus::ExcludedTitle => StatusTag::ExcludedTitle,
            RecordStatus::IncludedFinal => StatusTag::IncludedFinal,
            RecordStatus::ExcludedFullText(_) => StatusTag::ExcludedFullText,
        }
    }

    /// Whether the status is terminal
    pub fn is_terminal(&self) -> bool {
        self.tag().is_terminal()
    }

    /// Reason attached to an exclusion
    ///
    /// Removal statuses report their field label; the status name itself
    /// is the reason there.
    pub fn exclusion_reason(&self) -> Option<&str> {
        match self {
            RecordStatus::ExcludedFullText(reason) => Some(reason.as_str()),
            RecordStatus::RemovedWithout(field) => Some(field.label()),
            _ => None,
        }
    }

    /// Reason text to persist alongside the tag
    ///
    /// Only full-text exclusions store an explicit reason.
    pub fn stored_reason(&self) -> Option<&str> {
        match self {
            RecordStatus::ExcludedFullText(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::ExcludedFullText(reason) => write!(f, "excluded_fulltext ({})", reason),
            other => f.write_str(other.tag().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = StatusTag::ALL.iter().filter(|t| t.is_terminal()).collect();
        assert_eq!(terminal.len(), 8);
        assert!(!StatusTag::Unscreened.is_terminal());
        assert!(!StatusTag::IncludedTitle.is_terminal());
        assert!(!StatusTag::ExcludedTitle.is_terminal());
    }

    #[test]
    fn test_tag_parse() {
        for tag in StatusTag::ALL {
            assert_eq!(StatusTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(StatusTag::parse(" Included_Final "), Some(StatusTag::IncludedFinal));
        assert!("pending".parse::<StatusTag>().is_err());
    }

    #[test]
    fn test_tag_serde_names() {
        let json = serde_json::to_string(&StatusTag::ExcludedFullText).unwrap();
        assert_eq!(json, "\"excluded_fulltext\"");
        let json = serde_json::to_string(&StatusTag::RemovedWithoutUrl).unwrap();
        assert_eq!(json, "\"removed_without_url\"");
    }

    #[test]
    fn test_missing_field_parse() {
        assert_eq!(MissingField::parse("url"), Some(MissingField::Url));
        assert_eq!(MissingField::parse("no url"), Some(MissingField::Url));
        assert_eq!(MissingField::parse("missing_abstract"), Some(MissingField::Abstract));
        assert_eq!(MissingField::parse("No Authors"), Some(MissingField::Authors));
        assert_eq!(MissingField::parse("doi"), None);
    }

    #[test]
    fn test_from_parts_requires_reason_for_fulltext() {
        assert_eq!(
            RecordStatus::from_parts(StatusTag::ExcludedFullText, None),
            Err(DomainError::MissingExclusionReason)
        );
        assert_eq!(
            RecordStatus::from_parts(StatusTag::ExcludedFullText, Some("   ".into())),
            Err(DomainError::MissingExclusionReason)
        );

        let status =
            RecordStatus::from_parts(StatusTag::ExcludedFullText, Some("Wrong population".into()))
                .unwrap();
        assert_eq!(status.exclusion_reason(), Some("Wrong population"));
    }

    #[test]
    fn test_from_parts_rejects_stray_reason() {
        let result = RecordStatus::from_parts(StatusTag::IncludedFinal, Some("because".into()));
        assert!(matches!(result, Err(DomainError::UnexpectedExclusionReason(_))));
    }

    #[test]
    fn test_removal_reason_is_status_label() {
        let status = RecordStatus::from_parts(StatusTag::RemovedWithoutUrl, None).unwrap();
        assert_eq!(status, RecordStatus::RemovedWithout(MissingField::Url));
        assert_eq!(status.exclusion_reason(), Some("missing url"));
        assert_eq!(status.stored_reason(), None);
    }

    #[test]
    fn test_reason_only_on_exclusions() {
        assert_eq!(RecordStatus::Unscreened.exclusion_reason(), None);
        assert_eq!(RecordStatus::IncludedTitle.exclusion_reason(), None);
        assert_eq!(RecordStatus::IncludedFinal.exclusion_reason(), None);
        assert_eq!(RecordStatus::Duplicate.exclusion_reason(), None);
    }

    #[test]
    fn test_exclusion_reason_trimmed() {
        let reason = ExclusionReason::new("  Poor methodology ").unwrap();
        assert_eq!(reason.as_str(), "Poor methodology");
        assert_eq!(ExclusionReason::new(""), Err(DomainError::EmptyExclusionReason));
    }
}
