//! Delimited table of included studies
//!
//! Comma-separated, one header row, fixed column order. Fields containing a
//! comma, a double quote or a line break are quoted, with embedded quotes
//! doubled. Authors are joined with `"; "` inside one field.

use crate::{ExportError, Result};
use prisma_domain::{Authors, Candidate, Record, StatusTag};

/// Column order of the table
pub const COLUMNS: [&str; 6] = ["title", "authors", "year", "source", "url", "abstract"];

/// Separator between author names inside the authors column
pub const AUTHOR_SEPARATOR: &str = "; ";

/// Table of the `included_final` records, in record order
pub fn write_included<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    write_records(
        records
            .into_iter()
            .filter(|record| record.status().tag() == StatusTag::IncludedFinal),
    )
}

/// Table of the given records, whatever their status
pub fn write_records<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = String::new();
    write_row(&mut out, COLUMNS.iter().copied());

    let mut rows = 0;
    for record in records {
        let year = record.year.map(|y| y.to_string()).unwrap_or_default();
        let authors = record.authors.join(AUTHOR_SEPARATOR);
        write_row(
            &mut out,
            [
                record.title.as_str(),
                authors.as_str(),
                year.as_str(),
                record.source.as_str(),
                record.url.as_str(),
                record.abstract_text.as_str(),
            ],
        );
        rows += 1;
    }

    tracing::debug!("Wrote delimited table with {} rows", rows);
    out
}

fn write_row<'s, I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = &'s str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Parse a table written by [`write_records`] back into candidates
///
/// The header must list [`COLUMNS`] in order. Authors come back as a list.
pub fn parse_records(input: &str) -> Result<Vec<Candidate>> {
    let mut rows = split_rows(input)?.into_iter();

    let (line, header) = rows.next().ok_or_else(|| ExportError::Parse {
        line: 1,
        message: "missing header row".to_string(),
    })?;
    if !header.iter().map(|h| h.trim()).eq(COLUMNS.iter().copied()) {
        return Err(ExportError::Parse {
            line,
            message: format!("expected header {}", COLUMNS.join(",")),
        });
    }

    rows.map(|(line, fields)| parse_row(line, fields)).collect()
}

fn parse_row(line: usize, fields: Vec<String>) -> Result<Candidate> {
    let [title, authors, year, source, url, abstract_text]: [String; 6] =
        fields.try_into().map_err(|fields: Vec<String>| ExportError::Parse {
            line,
            message: format!("expected {} fields, found {}", COLUMNS.len(), fields.len()),
        })?;

    let year = match year.trim() {
        "" => None,
        text => Some(text.parse::<i32>().map_err(|_| ExportError::Parse {
            line,
            message: format!("year is not an integer: {}", text),
        })?),
    };

    let authors = Authors::list(
        authors
            .split(AUTHOR_SEPARATOR.trim())
            .map(str::trim)
            .filter(|name| !name.is_empty()),
    );

    Ok(Candidate {
        id: None,
        title,
        authors,
        year,
        source,
        abstract_text,
        url,
    })
}

/// Split RFC 4180 text into rows, each tagged with its starting line
fn split_rows(input: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                return Err(ExportError::Parse {
                    line,
                    message: "quote inside unquoted field".to_string(),
                })
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push((row_line, std::mem::take(&mut row)));
                line += 1;
                row_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ExportError::Parse {
            line: row_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push((row_line, row));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_domain::RecordStatus;

    fn included(id: &str, title: &str) -> Record {
        Record::new(id, title).with_status(RecordStatus::IncludedFinal)
    }

    #[test]
    fn test_header_and_quoting() {
        let record = included("a", "Metformin, \"the\" first-line drug")
            .with_authors(Authors::list(["Smith A", "Jones B"]))
            .with_year(2024)
            .with_source("PubMed")
            .with_abstract("Line one\nLine two");

        let table = write_included([&record]);

        assert_eq!(
            table,
            "title,authors,year,source,url,abstract\r\n\
             \"Metformin, \"\"the\"\" first-line drug\",Smith A; Jones B,2024,PubMed,,\"Line one\nLine two\"\r\n"
        );
    }

    #[test]
    fn test_only_included_final_written() {
        let records = vec![
            included("a", "Kept"),
            Record::new("b", "Screened").with_status(RecordStatus::IncludedTitle),
            Record::new("c", "Excluded").with_status(RecordStatus::ExcludedTitle),
        ];
        let parsed = parse_records(&write_included(&records)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Kept");
    }

    #[test]
    fn test_missing_year_is_blank() {
        let parsed = parse_records(&write_included([&included("a", "No year")])).unwrap();
        assert_eq!(parsed[0].year, None);
    }

    #[test]
    fn test_parse_accepts_lf_endings() {
        let parsed = parse_records("title,authors,year,source,url,abstract\nT,A; B,2020,S,U,X\n").unwrap();
        assert_eq!(parsed[0].authors, Authors::list(["A", "B"]));
        assert_eq!(parsed[0].year, Some(2020));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_records(""), Err(ExportError::Parse { line: 1, .. })));
        assert!(parse_records("title,authors\r\n").is_err());

        let header = "title,authors,year,source,url,abstract\r\n";
        let err = parse_records(&format!("{header}only,three,fields\r\n")).unwrap_err();
        assert_eq!(
            err,
            ExportError::Parse {
                line: 2,
                message: "expected 6 fields, found 3".to_string()
            }
        );
        assert!(parse_records(&format!("{header}T,A,twenty,S,U,X\r\n")).is_err());
        assert!(parse_records(&format!("{header}\"open,A,2020,S,U,X\r\n")).is_err());
        assert!(parse_records(&format!("{header}bad\"quote,A,2020,S,U,X\r\n")).is_err());
    }
}
