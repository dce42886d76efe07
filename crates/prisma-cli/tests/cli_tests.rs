//! End-to-end tests driving the CLI against a temporary state file.

use clap::Parser;
use prisma_cli::{Cli, CliError, StateFile};
use prisma_domain::{RecordStatus, StatusTag};
use prisma_export::{delimited, ReviewReport};
use prisma_workflow::WorkflowError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("review.json")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn state_file(&self) -> StateFile {
        StateFile::new(self.state_path())
    }

    async fn run(&self, args: &[&str]) -> prisma_cli::Result<()> {
        let state = self.state_path();
        let config = self.path("config.toml");
        let mut argv = vec![
            "prisma-flow",
            "--no-color",
            "--state",
            path_str(&state),
            "--config",
            path_str(&config),
        ];
        argv.extend_from_slice(args);
        prisma_cli::run(Cli::parse_from(argv)).await
    }

    fn status_of(&self, id: &str) -> RecordStatus {
        self.state_file()
            .load()
            .unwrap()
            .record(id)
            .unwrap()
            .status()
            .clone()
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

async fn searched_project() -> Project {
    let project = Project::new();
    project.run(&["init", "metformin"]).await.unwrap();
    project
        .run(&[
            "ingest",
            "--search",
            "--pubmed",
            "metformin[MeSH] AND diabetes",
            "--semantic-scholar",
            "metformin type 2 diabetes",
            "--arxiv",
            "metformin",
        ])
        .await
        .unwrap();
    project
}

#[tokio::test]
async fn test_init_and_search_ingest() {
    let project = searched_project().await;

    let state = project.state_file().load().unwrap();
    assert_eq!(state.project_id(), "metformin");
    assert_eq!(state.len(), 7);
    assert_eq!(state.next_unscreened().unwrap().id.as_str(), "pubmed_1");
}

#[tokio::test]
async fn test_init_refuses_existing_project() {
    let project = Project::new();
    project.run(&["init", "metformin"]).await.unwrap();

    let err = project.run(&["init", "other"]).await.unwrap_err();
    assert!(matches!(err, CliError::State(_)));
    project.run(&["init", "other", "--force"]).await.unwrap();
    assert_eq!(project.state_file().load().unwrap().project_id(), "other");
}

#[tokio::test]
async fn test_commands_need_a_project() {
    let project = Project::new();
    assert!(matches!(project.run(&["counts"]).await, Err(CliError::State(_))));
}

#[tokio::test]
async fn test_search_without_strategy_fails() {
    let project = Project::new();
    project.run(&["init", "metformin"]).await.unwrap();

    let err = project.run(&["ingest", "--search"]).await.unwrap_err();
    assert!(matches!(err, CliError::Sync(_)));
    assert!(project.state_file().load().unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_file_then_dedup() {
    let project = Project::new();
    project.run(&["init", "p"]).await.unwrap();
    let candidates = project.path("candidates.json");
    fs::write(
        &candidates,
        r#"[
            {"id": "a", "title": "Metformin and CVD Risk", "authors": ["Smith A"], "year": 2020},
            {"id": "b", "title": "metformin and cvd risk ", "authors": ["Smith A"], "year": 2020},
            {"id": "c", "title": "Unrelated trial of exercise"}
        ]"#,
    )
    .unwrap();

    project.run(&["ingest", "--file", path_str(&candidates)]).await.unwrap();
    project.run(&["dedup"]).await.unwrap();
    project.run(&["dedup"]).await.unwrap();

    assert_eq!(project.status_of("a"), RecordStatus::Unscreened);
    assert_eq!(project.status_of("b"), RecordStatus::Duplicate);
    assert_eq!(project.status_of("c"), RecordStatus::Unscreened);

    // Re-ingesting the same ids changes nothing
    let err = project.run(&["ingest", "--file", path_str(&candidates)]).await.unwrap_err();
    assert!(matches!(err, CliError::Workflow(WorkflowError::DuplicateId(_))));
    assert_eq!(project.state_file().load().unwrap().len(), 3);
}

#[tokio::test]
async fn test_remove_incomplete() {
    let project = searched_project().await;

    project.run(&["remove-incomplete", "abstract"]).await.unwrap();
    assert_eq!(project.status_of("arxiv_1"), RecordStatus::Unscreened);

    project.run(&["remove-incomplete", "url"]).await.unwrap();
    let state = project.state_file().load().unwrap();
    assert_eq!(state.records_with_status(StatusTag::RemovedWithoutUrl).count(), 7);
}

#[tokio::test]
async fn test_rejected_id_discards_whole_batch() {
    let project = searched_project().await;
    let before = project.state_file().load().unwrap();

    let err = project
        .run(&["screen", "include", "pubmed_1", "missing", "pubmed_2"])
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Workflow(WorkflowError::UnknownRecord(_))));
    assert_eq!(project.state_file().load().unwrap(), before);
    assert_eq!(project.status_of("pubmed_1"), RecordStatus::Unscreened);

    project.run(&["screen", "include", "pubmed_1", "pubmed_2"]).await.unwrap();
    assert_eq!(project.status_of("pubmed_2"), RecordStatus::IncludedTitle);
}

#[tokio::test]
async fn test_exclusion_needs_reason() {
    let project = searched_project().await;
    project.run(&["screen", "include", "pubmed_1"]).await.unwrap();

    let err = project.run(&["eligibility", "exclude", "pubmed_1"]).await.unwrap_err();
    assert!(matches!(err, CliError::Workflow(WorkflowError::EmptyReason)));
    assert_eq!(project.status_of("pubmed_1"), RecordStatus::IncludedTitle);
}

#[tokio::test]
async fn test_full_review() {
    let project = searched_project().await;

    project
        .run(&[
            "screen", "include", "pubmed_1", "pubmed_2", "pubmed_3", "semantic_1", "semantic_2", "arxiv_1",
        ])
        .await
        .unwrap();
    project.run(&["screen", "exclude", "arxiv_2"]).await.unwrap();

    // Pending decisions block the figure
    let err = project.run(&["prisma"]).await.unwrap_err();
    assert!(matches!(err, CliError::Export(_)));

    project
        .run(&["eligibility", "include", "pubmed_1", "semantic_1"])
        .await
        .unwrap();
    project
        .run(&["eligibility", "exclude", "pubmed_2", "--reason", "no comparative data"])
        .await
        .unwrap();
    project
        .run(&[
            "eligibility",
            "exclude",
            "pubmed_3",
            "semantic_2",
            "arxiv_1",
            "--reason",
            "Wrong population",
        ])
        .await
        .unwrap();
    project
        .run(&[
            "extract",
            "pubmed_1",
            "--n-intervention",
            "120",
            "--mean-intervention",
            "-1.5",
            "--sd-intervention",
            "0.8",
            "--n-control",
            "118",
            "--mean-control",
            "-0.2",
            "--sd-control",
            "0.9",
        ])
        .await
        .unwrap();

    assert_eq!(
        project.status_of("pubmed_2").exclusion_reason(),
        Some("No comparative data")
    );
    project.run(&["counts"]).await.unwrap();
    project.run(&["--format", "json", "prisma"]).await.unwrap();
    project.run(&["next", "eligibility"]).await.unwrap();

    let table = project.path("included.csv");
    project.run(&["export", "--output", path_str(&table)]).await.unwrap();
    let exported = delimited::parse_records(&fs::read_to_string(&table).unwrap()).unwrap();
    let titles: Vec<&str> = exported.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Metformin and Glycemic Control in Type 2 Diabetes: A Systematic Review",
            "Metformin Mechanism of Action in Type 2 Diabetes",
        ]
    );

    let report_path = project.path("report.json");
    project.run(&["report", "-o", path_str(&report_path)]).await.unwrap();
    let report: ReviewReport = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let figure = report.prisma.unwrap();
    assert_eq!(figure.identified_databases, 7);
    assert_eq!(figure.excluded_screening, 1);
    assert_eq!(figure.total_excluded, 4);
    assert_eq!(figure.exclusion_reasons.get("Wrong population"), Some(&3));
    assert_eq!(figure.studies_qualitative_synthesis, 2);
    assert_eq!(figure.studies_meta_analysis, 1);
    assert_eq!(report.included[0].extraction.unwrap().n_control, Some(118));
}

#[tokio::test]
async fn test_bad_extraction_value_stores_nothing() {
    let project = searched_project().await;

    let err = project
        .run(&["extract", "pubmed_1", "--n-intervention", "many"])
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Workflow(WorkflowError::Domain(_))));
    assert!(project.state_file().load().unwrap().ledger().is_empty());
}

#[tokio::test]
async fn test_config_init_and_show() {
    let project = Project::new();
    project.run(&["config", "init"]).await.unwrap();
    assert!(project.path("config.toml").exists());

    let err = project.run(&["config", "init"]).await.unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    project.run(&["config", "show"]).await.unwrap();
}
