//! PrismaFlow CLI library.
//!
//! This library provides the core functionality for the `prisma-flow`
//! command-line interface: configuration management, the project state
//! file, command execution and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod state_file;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use state_file::StateFile;

use prisma_workflow::WorkflowEngine;

/// Load configuration and run the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let state_file = StateFile::new(cli.state.unwrap_or_else(|| config.settings.state_file.clone()));
    let engine = WorkflowEngine::new(config.workflow.clone())?;
    tracing::debug!("Using state file {}", state_file.path().display());

    match cli.command {
        Command::Init(args) => commands::execute_init(args, &state_file, &config, &formatter),
        Command::Ingest(args) => {
            commands::execute_ingest(args, &state_file, &engine, &config, &formatter).await
        }
        Command::Dedup => commands::execute_dedup(&state_file, &engine, &formatter),
        Command::RemoveIncomplete(args) => {
            commands::execute_remove_incomplete(args, &state_file, &engine, &formatter)
        }
        Command::Screen(args) => commands::execute_screen(args, &state_file, &engine, &formatter),
        Command::Eligibility(args) => {
            commands::execute_eligibility(args, &state_file, &engine, &formatter)
        }
        Command::Extract(args) => commands::execute_extract(args, &state_file, &engine, &formatter),
        Command::Counts => commands::execute_counts(&state_file, &formatter),
        Command::Prisma => commands::execute_prisma(&state_file, &formatter),
        Command::Export(args) => commands::execute_export(args, &state_file, &formatter),
        Command::Report(args) => commands::execute_report(args, &state_file, &formatter),
        Command::Next(args) => commands::execute_next(args, &state_file, &formatter),
        Command::List(args) => commands::execute_list(args, &state_file, &formatter),
        Command::Config(args) => commands::execute_config(args, &config_path, &config, &formatter),
    }
}
