//! Merge records loaded from the store into local state

use prisma_domain::{Record, RecordId};
use prisma_workflow::{ProjectWorkflowState, StatusChange, WorkflowEngine, WorkflowError};
use serde::Serialize;

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Remote-only records added to local state
    pub restored: Vec<RecordId>,
    /// Records whose remote status lags the local one
    pub stale_remote: Vec<StatusChange>,
}

/// Reconcile remote records with local state
///
/// Local status always wins for ids present locally; those whose remote
/// status differs are reported so the caller can push them again.
/// Remote-only records are restored with their stored status.
pub fn reconcile(
    engine: &WorkflowEngine,
    state: &mut ProjectWorkflowState,
    remote: Vec<Record>,
) -> Result<ReconcileReport, WorkflowError> {
    let mut report = ReconcileReport::default();
    let mut missing = Vec::new();

    for record in remote {
        match state.record(record.id.as_str()) {
            Some(local) if local.status() != record.status() => {
                report.stale_remote.push(StatusChange {
                    record_id: local.id.clone(),
                    from: record.status().tag(),
                    to: local.status().tag(),
                    reason: local.status().stored_reason().map(str::to_string),
                });
            }
            Some(_) => {}
            None => {
                if !missing.iter().any(|r: &Record| r.id == record.id) {
                    missing.push(record);
                }
            }
        }
    }

    report.restored = missing.iter().map(|r| r.id.clone()).collect();
    if !missing.is_empty() {
        engine.restore_records(state, missing)?;
    }

    tracing::info!(
        "Reconciled project '{}': {} restored, {} stale remote",
        state.project_id(),
        report.restored.len(),
        report.stale_remote.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_domain::{RecordStatus, StatusTag};

    #[test]
    fn test_local_status_wins() {
        let engine = WorkflowEngine::default_config();
        let mut state = ProjectWorkflowState::new("p", engine.config());
        engine
            .restore_records(&mut state, vec![Record::new("a", "A")])
            .unwrap();
        engine.screen_include(&mut state, "a").unwrap();

        let remote = vec![
            Record::new("a", "A"),
            Record::new("b", "B").with_status(RecordStatus::ExcludedTitle),
        ];
        let report = reconcile(&engine, &mut state, remote).unwrap();

        assert_eq!(state.record("a").unwrap().status(), &RecordStatus::IncludedTitle);
        assert_eq!(state.record("b").unwrap().status(), &RecordStatus::ExcludedTitle);
        assert_eq!(report.restored, vec![RecordId::from("b")]);
        assert_eq!(report.stale_remote.len(), 1);
        assert_eq!(report.stale_remote[0].from, StatusTag::Unscreened);
        assert_eq!(report.stale_remote[0].to, StatusTag::IncludedTitle);
    }

    #[test]
    fn test_in_sync_is_noop() {
        let engine = WorkflowEngine::default_config();
        let mut state = ProjectWorkflowState::new("p", engine.config());
        engine
            .restore_records(&mut state, vec![Record::new("a", "A")])
            .unwrap();
        let before = state.clone();

        let report = reconcile(&engine, &mut state, vec![Record::new("a", "A")]).unwrap();
        assert_eq!(report, ReconcileReport::default());
        assert_eq!(state, before);
    }

    #[test]
    fn test_repeated_remote_ids_restored_once() {
        let engine = WorkflowEngine::default_config();
        let mut state = ProjectWorkflowState::new("p", engine.config());
        let remote = vec![Record::new("x", "X"), Record::new("x", "X again")];
        let report = reconcile(&engine, &mut state, remote).unwrap();
        assert_eq!(report.restored.len(), 1);
        assert_eq!(state.record("x").unwrap().title, "X");
    }
}
