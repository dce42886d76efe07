//! Read-only reporting commands.

use crate::cli::OutputArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::state_file::StateFile;
use prisma_export::{delimited, PrismaFigure, ReviewReport};
use prisma_workflow::FlowCounter;
use std::fs;
use std::path::Path;

/// Execute the counts command.
pub fn execute_counts(state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let counts = FlowCounter::for_state(&state).compute(state.records());
    println!("{}", formatter.format_counts(&counts)?);

    if !counts.is_reconciled() {
        tracing::error!("Counts do not reconcile for project '{}'", state.project_id());
    }
    Ok(())
}

/// Execute the prisma command.
pub fn execute_prisma(state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let figure = PrismaFigure::for_state(&state)?;
    println!("{}", formatter.format_document(&figure, || figure.to_text())?);
    Ok(())
}

/// Execute the export command.
pub fn execute_export(args: OutputArgs, state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let table = delimited::write_included(state.records());
    write_output(args.output.as_deref(), &table, formatter)
}

/// Execute the report command.
pub fn execute_report(args: OutputArgs, state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let report = ReviewReport::build_now(&state)?;
    if report.prisma.is_none() {
        eprintln!(
            "{}",
            formatter.warning("Review has pending decisions; PRISMA figure omitted")
        );
    }
    write_output(args.output.as_deref(), &report.to_json()?, formatter)
}

fn write_output(path: Option<&Path>, contents: &str, formatter: &Formatter) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents)?;
            eprintln!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
        None => print!("{}", contents),
    }
    Ok(())
}
