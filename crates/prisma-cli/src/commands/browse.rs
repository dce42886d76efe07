//! Record browsing commands.

use crate::cli::{ListArgs, NextArgs, Stage};
use crate::error::Result;
use crate::output::Formatter;
use crate::state_file::StateFile;
use prisma_domain::Record;

/// Execute the next command.
pub fn execute_next(args: NextArgs, state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let next = match args.stage {
        Stage::Screening => state.next_unscreened(),
        Stage::Eligibility => state.next_awaiting_eligibility(),
    };

    match next {
        Some(record) => {
            println!("{}", formatter.format_records(&[record])?);
            let remaining = state.records_with_status(args.stage.into()).count();
            eprintln!("{}", formatter.info(&format!("{} record(s) in this queue", remaining)));
        }
        None => println!("{}", formatter.info("Nothing left to decide at this stage.")),
    }
    Ok(())
}

/// Execute the list command.
pub fn execute_list(args: ListArgs, state_file: &StateFile, formatter: &Formatter) -> Result<()> {
    let state = state_file.load()?;
    let records: Vec<&Record> = match args.status {
        Some(status) => state.records_with_status(status).collect(),
        None => state.records().collect(),
    };
    println!("{}", formatter.format_records(&records)?);
    Ok(())
}
