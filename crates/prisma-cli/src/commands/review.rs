//! Commands that move records through the workflow.

use crate::cli::{DecisionArgs, Decision, EligibilityArgs, ExtractArgs, RemoveIncompleteArgs};
use crate::error::Result;
use crate::output::Formatter;
use crate::state_file::StateFile;
use prisma_domain::{MissingField, RawExtractionRow};
use prisma_workflow::{ProjectWorkflowState, StatusChange, WorkflowEngine, WorkflowError};

/// Execute the dedup command.
pub fn execute_dedup(state_file: &StateFile, engine: &WorkflowEngine, formatter: &Formatter) -> Result<()> {
    let mut state = state_file.load()?;
    let outcome = engine.mark_duplicates(&mut state);
    state_file.save(&state)?;

    println!("{}", formatter.format_matches(&outcome.matches)?);
    eprintln!("{}", formatter.bulk_result("Marked duplicate", outcome.changes.len()));
    Ok(())
}

/// Execute the remove-incomplete command.
pub fn execute_remove_incomplete(
    args: RemoveIncompleteArgs,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    formatter: &Formatter,
) -> Result<()> {
    let mut state = state_file.load()?;
    let changes = match args.field {
        Some(field) => engine.remove_incomplete(&mut state, MissingField::from(field)),
        None => {
            if engine.config().completeness_fields.is_empty() {
                eprintln!("{}", formatter.warning("No completeness rules configured"));
            }
            engine.apply_completeness_rules(&mut state)
        }
    };
    state_file.save(&state)?;

    println!("{}", formatter.format_changes(&changes)?);
    eprintln!("{}", formatter.bulk_result("Removed", changes.len()));
    Ok(())
}

/// Execute the screen command.
pub fn execute_screen(
    args: DecisionArgs,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    formatter: &Formatter,
) -> Result<()> {
    apply_each(state_file, formatter, &args.ids, |state, id| match args.decision {
        Decision::Include => engine.screen_include(state, id),
        Decision::Exclude => engine.screen_exclude(state, id),
    })
}

/// Execute the eligibility command.
pub fn execute_eligibility(
    args: EligibilityArgs,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    formatter: &Formatter,
) -> Result<()> {
    if args.decision == Decision::Include && args.reason.is_some() {
        eprintln!("{}", formatter.warning("--reason is ignored for inclusions"));
    }

    let reason = args.reason.unwrap_or_default();
    apply_each(state_file, formatter, &args.ids, |state, id| match args.decision {
        Decision::Include => engine.eligibility_include(state, id),
        Decision::Exclude => engine.eligibility_exclude(state, id, &reason),
    })
}

/// Execute the extract command.
pub fn execute_extract(
    args: ExtractArgs,
    state_file: &StateFile,
    engine: &WorkflowEngine,
    formatter: &Formatter,
) -> Result<()> {
    let raw = RawExtractionRow {
        n_intervention: args.n_intervention,
        mean_intervention: args.mean_intervention,
        sd_intervention: args.sd_intervention,
        n_control: args.n_control,
        mean_control: args.mean_control,
        sd_control: args.sd_control,
    };

    let mut state = state_file.load()?;
    engine.set_raw_extraction_row(&mut state, &args.id, &raw)?;
    state_file.save(&state)?;

    println!("{}", formatter.success(&format!("Stored extraction row for {}", args.id)));
    Ok(())
}

/// Apply `op` to each id in order and save only if every id succeeds
///
/// The state is loaded fresh, so a rejected id discards the whole batch.
fn apply_each<F>(state_file: &StateFile, formatter: &Formatter, ids: &[String], mut op: F) -> Result<()>
where
    F: FnMut(&mut ProjectWorkflowState, &str) -> std::result::Result<StatusChange, WorkflowError>,
{
    let mut state = state_file.load()?;
    let mut changes = Vec::with_capacity(ids.len());

    for (applied, id) in ids.iter().enumerate() {
        match op(&mut state, id) {
            Ok(change) => changes.push(change),
            Err(e) => {
                if applied > 0 {
                    eprintln!(
                        "{}",
                        formatter.warning(&format!("Rejected '{}'; none of the {} decisions were saved", id, ids.len()))
                    );
                }
                return Err(e.into());
            }
        }
    }

    state_file.save(&state)?;
    println!("{}", formatter.format_changes(&changes)?);
    Ok(())
}
