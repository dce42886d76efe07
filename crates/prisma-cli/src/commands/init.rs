//! Init command implementation.

use crate::cli::InitArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::state_file::StateFile;

/// Execute the init command.
pub fn execute_init(args: InitArgs, state_file: &StateFile, config: &Config, formatter: &Formatter) -> Result<()> {
    let state = state_file.create(&args.project_id, &config.workflow, args.force)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Created project '{}' in {} ({} exclusion reasons)",
            state.project_id(),
            state_file.path().display(),
            state.catalog().entries().len()
        ))
    );
    Ok(())
}
