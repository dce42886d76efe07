//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use prisma_domain::{MissingField, StatusTag};
use std::path::PathBuf;

/// PrismaFlow - Run a systematic review from the command line.
#[derive(Debug, Parser)]
#[command(name = "prisma-flow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project state file
    #[arg(short, long, global = true, env = "PRISMA_STATE")]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PRISMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty project state file
    Init(InitArgs),

    /// Add candidate records from a file or a search
    Ingest(IngestArgs),

    /// Mark later duplicates of earlier records
    Dedup,

    /// Remove records lacking a field before screening
    RemoveIncomplete(RemoveIncompleteArgs),

    /// Title/abstract screening decision
    Screen(DecisionArgs),

    /// Full-text eligibility decision
    Eligibility(EligibilityArgs),

    /// Enter extraction data for an included study
    Extract(ExtractArgs),

    /// Show flow counts
    Counts,

    /// Show the PRISMA 2020 figure of a finished review
    Prisma,

    /// Write the included studies as a comma-separated table
    Export(OutputArgs),

    /// Write a JSON report of the review
    Report(OutputArgs),

    /// Show the next record awaiting a decision
    Next(NextArgs),

    /// List records
    List(ListArgs),

    /// Show or initialise the configuration file
    Config(ConfigArgs),
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Project identifier
    pub project_id: String,

    /// Overwrite an existing state file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// JSON array of candidates, or a `.csv` table
    #[arg(short = 'F', long, conflicts_with = "search")]
    pub file: Option<PathBuf>,

    /// Query the built-in demonstration sources instead of reading a file
    #[arg(long)]
    pub search: bool,

    /// PubMed strategy
    #[arg(long, requires = "search")]
    pub pubmed: Option<String>,

    /// Semantic Scholar strategy
    #[arg(long, requires = "search")]
    pub semantic_scholar: Option<String>,

    /// ArXiv strategy
    #[arg(long, requires = "search")]
    pub arxiv: Option<String>,
}

/// Arguments for the remove-incomplete command.
#[derive(Debug, Parser)]
pub struct RemoveIncompleteArgs {
    /// Field that must be present; omit to apply the configured rules
    #[arg(value_enum)]
    pub field: Option<FieldArg>,
}

/// Arguments for the screen command.
#[derive(Debug, Parser)]
pub struct DecisionArgs {
    /// Include or exclude
    #[arg(value_enum)]
    pub decision: Decision,

    /// Record ids, applied in order
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the eligibility command.
#[derive(Debug, Parser)]
pub struct EligibilityArgs {
    /// Include or exclude
    #[arg(value_enum)]
    pub decision: Decision,

    /// Record ids, applied in order
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Exclusion reason: a catalog entry or free text
    #[arg(short, long)]
    pub reason: Option<String>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Record id
    pub id: String,

    /// Intervention arm sample size
    #[arg(long, default_value = "")]
    pub n_intervention: String,

    /// Intervention arm mean
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub mean_intervention: String,

    /// Intervention arm standard deviation
    #[arg(long, default_value = "")]
    pub sd_intervention: String,

    /// Control arm sample size
    #[arg(long, default_value = "")]
    pub n_control: String,

    /// Control arm mean
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub mean_control: String,

    /// Control arm standard deviation
    #[arg(long, default_value = "")]
    pub sd_control: String,
}

/// Arguments for commands writing a document.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the next command.
#[derive(Debug, Parser)]
pub struct NextArgs {
    /// Which decision queue to look at
    #[arg(value_enum, default_value = "screening")]
    pub stage: Stage,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only records in this status (e.g. unscreened, included_final)
    #[arg(short = 'S', long, value_parser = parse_status)]
    pub status: Option<StatusTag>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Screening or eligibility decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Decision {
    /// Move the record forward
    Include,
    /// Exclude the record
    Exclude,
}

/// Decision queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    /// Records awaiting title/abstract screening
    Screening,
    /// Records awaiting full-text eligibility
    Eligibility,
}

/// Descriptive field argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FieldArg {
    /// Title
    Title,
    /// Authors
    Authors,
    /// Year
    Year,
    /// Url
    Url,
    /// Abstract
    Abstract,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<FieldArg> for MissingField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Title => MissingField::Title,
            FieldArg::Authors => MissingField::Authors,
            FieldArg::Year => MissingField::Year,
            FieldArg::Url => MissingField::Url,
            FieldArg::Abstract => MissingField::Abstract,
        }
    }
}

impl From<Stage> for StatusTag {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Screening => StatusTag::Unscreened,
            Stage::Eligibility => StatusTag::IncludedTitle,
        }
    }
}

fn parse_status(s: &str) -> Result<StatusTag, String> {
    StatusTag::parse(s).ok_or_else(|| format!("unknown status '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_command() {
        let cli = Cli::parse_from(["prisma-flow", "screen", "include", "a", "b"]);
        match cli.command {
            Command::Screen(args) => {
                assert_eq!(args.decision, Decision::Include);
                assert_eq!(args.ids, vec!["a", "b"]);
            }
            _ => panic!("Expected Screen command"),
        }
    }

    #[test]
    fn test_eligibility_reason() {
        let cli = Cli::parse_from([
            "prisma-flow",
            "eligibility",
            "exclude",
            "a",
            "--reason",
            "Poor methodology",
        ]);
        match cli.command {
            Command::Eligibility(args) => {
                assert_eq!(args.decision, Decision::Exclude);
                assert_eq!(args.reason.as_deref(), Some("Poor methodology"));
            }
            _ => panic!("Expected Eligibility command"),
        }
    }

    #[test]
    fn test_global_state_flag() {
        let cli = Cli::parse_from(["prisma-flow", "counts", "--state", "other.json"]);
        assert_eq!(cli.state, Some(PathBuf::from("other.json")));
        assert!(matches!(cli.command, Command::Counts));
    }

    #[test]
    fn test_strategies_require_search() {
        assert!(Cli::try_parse_from(["prisma-flow", "ingest", "--pubmed", "metformin"]).is_err());
        assert!(Cli::try_parse_from(["prisma-flow", "ingest", "--search", "--pubmed", "metformin"]).is_ok());
    }

    #[test]
    fn test_negative_mean_accepted() {
        let cli = Cli::parse_from(["prisma-flow", "extract", "a", "--mean-intervention", "-1.5"]);
        match cli.command {
            Command::Extract(args) => assert_eq!(args.mean_intervention, "-1.5"),
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_list_status_parsing() {
        let cli = Cli::parse_from(["prisma-flow", "list", "--status", "excluded_fulltext"]);
        match cli.command {
            Command::List(args) => assert_eq!(args.status, Some(StatusTag::ExcludedFullText)),
            _ => panic!("Expected List command"),
        }
        assert!(Cli::try_parse_from(["prisma-flow", "list", "--status", "maybe"]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(MissingField::from(FieldArg::Abstract), MissingField::Abstract);
        assert_eq!(StatusTag::from(Stage::Eligibility), StatusTag::IncludedTitle);
    }
}
