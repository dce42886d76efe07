//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use prisma_domain::Record;
use prisma_workflow::{CountReport, DuplicateMatch, StatusChange};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const TITLE_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format records.
    pub fn format_records(&self, records: &[&Record]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(join_ids(records.iter().map(|r| r.id.as_str()))),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No records found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Year", "Source", "Status"]);
                for record in records {
                    let year = record.year.map(|y| y.to_string()).unwrap_or_default();
                    let status = match record.status().exclusion_reason() {
                        Some(reason) => format!("{} ({})", record.status().tag(), reason),
                        None => record.status().tag().to_string(),
                    };
                    builder.push_record([
                        record.id.as_str(),
                        &truncate(&record.title, TITLE_WIDTH),
                        &year,
                        &record.source,
                        &status,
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format committed status changes.
    pub fn format_changes(&self, changes: &[StatusChange]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(changes)?),
            OutputFormat::Quiet => Ok(join_ids(changes.iter().map(|c| c.record_id.as_str()))),
            OutputFormat::Table => {
                if changes.is_empty() {
                    return Ok(self.info("No records changed."));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "From", "To", "Reason"]);
                for change in changes {
                    builder.push_record([
                        change.record_id.as_str(),
                        change.from.as_str(),
                        change.to.as_str(),
                        change.reason.as_deref().unwrap_or(""),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format duplicate matches.
    pub fn format_matches(&self, matches: &[DuplicateMatch]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(matches)?),
            OutputFormat::Quiet => Ok(join_ids(matches.iter().map(|m| m.duplicate.as_str()))),
            OutputFormat::Table => {
                if matches.is_empty() {
                    return Ok(self.info("No duplicates found."));
                }

                let mut builder = Builder::default();
                builder.push_record(["Duplicate", "Canonical", "Similarity", "Rule"]);
                for found in matches {
                    let similarity = format!("{:.3}", found.similarity);
                    let rule = format!("{:?}", found.rule);
                    builder.push_record([
                        found.duplicate.as_str(),
                        found.canonical.as_str(),
                        &similarity,
                        &rule,
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format flow counts.
    pub fn format_counts(&self, counts: &CountReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(counts)?),
            OutputFormat::Quiet => Ok(format!(
                "{} {} {} {}",
                counts.identified, counts.screened_count, counts.excluded_full_text, counts.included_final
            )),
            OutputFormat::Table => Ok(counts.summary()),
        }
    }

    /// Format any serializable document; tables fall back to `text`.
    pub fn format_document<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table | OutputFormat::Quiet => Ok(text()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format bulk operation result.
    pub fn bulk_result(&self, operation: &str, count: usize) -> String {
        self.success(&format!("{} {} record(s)", operation, count))
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

/// Shorten `text` to at most `width` characters.
pub fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_domain::{RecordId, RecordStatus, StatusTag};

    fn records() -> Vec<Record> {
        vec![
            Record::new("pubmed_1", "Metformin and HbA1c").with_year(2023).with_source("PubMed"),
            Record::new("pubmed_2", "Metformin and weight")
                .with_status(RecordStatus::from_parts(StatusTag::ExcludedFullText, Some("Poor methodology".into())).unwrap()),
        ]
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let output = formatter.format_records(&refs).unwrap();
        assert!(output.contains("Title"));
        assert!(output.contains("pubmed_1"));
        assert!(output.contains("excluded_fulltext (Poor methodology)"));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        assert_eq!(formatter.format_records(&refs).unwrap(), "pubmed_1\npubmed_2");
    }

    #[test]
    fn test_json_changes() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let change = StatusChange {
            record_id: RecordId::new("a"),
            from: StatusTag::Unscreened,
            to: StatusTag::IncludedTitle,
            reason: None,
        };
        let output = formatter.format_changes(&[change]).unwrap();
        assert!(output.contains("\"included_title\""));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_records(&[]).unwrap().contains("No records found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }
}
