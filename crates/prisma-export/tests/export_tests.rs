//! Integration tests for prisma-export

use prisma_domain::{Authors, Candidate, Record, RecordStatus};
use prisma_export::{delimited, ExportError, PrismaFigure, ReviewReport};
use prisma_workflow::{ProjectWorkflowState, WorkflowEngine};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(','),
            Just('"'),
            Just('\n'),
            Just('\r'),
            Just(' '),
            prop::char::range('a', 'z'),
        ],
        0..20,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn author() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,8} [A-Z]"
}

fn included_record() -> impl Strategy<Value = Record> {
    (
        field(),
        prop::collection::vec(author(), 0..4),
        prop::option::of(1900i32..2030),
        field(),
        field(),
        field(),
    )
        .prop_map(|(title, authors, year, source, url, abstract_text)| {
            Record::from_candidate(Candidate {
                id: None,
                title,
                authors: Authors::list(authors),
                year,
                source,
                abstract_text,
                url,
            })
            .with_status(RecordStatus::IncludedFinal)
        })
}

proptest! {
    #[test]
    fn test_included_table_reads_back(records in prop::collection::vec(included_record(), 0..8)) {
        let table = delimited::write_included(&records);
        let parsed = delimited::parse_records(&table).unwrap();

        prop_assert_eq!(parsed.len(), records.len());
        for (candidate, record) in parsed.iter().zip(&records) {
            prop_assert_eq!(&candidate.title, &record.title);
            prop_assert_eq!(candidate.authors.names(), record.authors.names());
            prop_assert_eq!(candidate.year, record.year);
            prop_assert_eq!(&candidate.source, &record.source);
            prop_assert_eq!(&candidate.url, &record.url);
            prop_assert_eq!(&candidate.abstract_text, &record.abstract_text);
        }
    }
}

fn finished_review() -> ProjectWorkflowState {
    let engine = WorkflowEngine::default_config();
    let mut state = ProjectWorkflowState::new("metformin", engine.config());

    let titles = [
        "Metformin and HbA1c in adolescents",
        "Cardiovascular outcomes of metformin",
        "Weight change under metformin therapy",
        "Renal safety of metformin",
        "Metformin versus sulfonylureas",
        "Lactic acidosis incidence with biguanides",
        "Cognitive decline and metformin use",
        "Cancer incidence among metformin users",
    ];
    let mut candidates: Vec<Candidate> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| Candidate {
            authors: Authors::list(["Smith A"]),
            year: Some(2020),
            source: "PubMed".to_string(),
            abstract_text: "Abstract".to_string(),
            url: format!("https://example.org/{}", i),
            ..Candidate::titled(*title)
        })
        .collect();
    candidates.push(Candidate {
        source: "PubMed".to_string(),
        ..Candidate::titled(titles[0])
    });
    candidates.push(Candidate {
        abstract_text: String::new(),
        ..Candidate::titled("Hand-searched study without an abstract")
    });

    let ids = engine.ingest_records(&mut state, candidates).unwrap();
    engine.mark_duplicates(&mut state);
    engine.remove_incomplete(&mut state, prisma_domain::MissingField::Abstract);

    engine.screen_exclude(&mut state, ids[0].as_str()).unwrap();
    engine.screen_exclude(&mut state, ids[1].as_str()).unwrap();
    for id in &ids[2..8] {
        engine.screen_include(&mut state, id.as_str()).unwrap();
    }
    engine
        .eligibility_exclude(&mut state, ids[2].as_str(), "No comparative data")
        .unwrap();
    engine
        .eligibility_exclude(&mut state, ids[3].as_str(), "Wrong outcome measure")
        .unwrap();
    for id in &ids[4..8] {
        engine.eligibility_include(&mut state, id.as_str()).unwrap();
    }
    state
}

#[test]
fn test_figure_of_finished_review() {
    let state = finished_review();
    let figure = PrismaFigure::for_state(&state).unwrap();

    assert_eq!(figure.identified_databases, 9);
    assert_eq!(figure.identified_other_methods, 1);
    assert_eq!(figure.duplicates_removed, 1);
    assert_eq!(figure.other_removed_before_screening, 1);
    assert_eq!(figure.records_screened, 8);
    assert_eq!(figure.excluded_screening, 2);
    assert_eq!(figure.reports_assessed_fulltext, 6);
    assert_eq!(figure.total_excluded, 2);
    assert_eq!(figure.exclusion_reasons.get("No comparative data"), Some(&1));
    assert_eq!(figure.exclusion_reasons.get("Wrong outcome measure"), Some(&1));
    assert_eq!(figure.studies_qualitative_synthesis, 4);
    assert_eq!(figure.studies_meta_analysis, 0);
}

#[test]
fn test_figure_waits_for_decisions() {
    let engine = WorkflowEngine::default_config();
    let mut state = ProjectWorkflowState::new("metformin", engine.config());
    let ids = engine
        .ingest_records(&mut state, vec![Candidate::titled("A"), Candidate::titled("B")])
        .unwrap();
    engine.screen_include(&mut state, ids[0].as_str()).unwrap();

    assert_eq!(
        PrismaFigure::for_state(&state),
        Err(ExportError::Pending {
            unscreened: 1,
            awaiting_eligibility: 1
        })
    );
}

#[test]
fn test_report_and_table_agree() {
    let state = finished_review();
    let report = ReviewReport::build(&state, 1_700_000_000).unwrap();
    let table = delimited::parse_records(&delimited::write_included(state.records())).unwrap();

    let titles: Vec<&str> = report.included.iter().map(|s| s.title.as_str()).collect();
    let table_titles: Vec<&str> = table.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, table_titles);
    assert!(report.counts.is_reconciled());
    assert_eq!(report.prisma.unwrap().studies_qualitative_synthesis, 4);
}
