//! Property tests over random record sets and decision sequences

use prisma_domain::{Candidate, MissingField, StatusTag};
use prisma_workflow::{FlowCounter, ProjectWorkflowState, WorkflowEngine};
use proptest::prelude::*;

const TITLES: [&str; 5] = [
    "Metformin and CVD Risk",
    "metformin and cvd risk ",
    "Metformin and CVD Risks",
    "Lactic Acidosis with Metformin",
    "",
];

#[derive(Debug, Clone)]
enum Step {
    ScreenInclude(usize),
    ScreenExclude(usize),
    EligibilityInclude(usize),
    EligibilityExclude(usize, &'static str),
    Dedup,
    Remove(MissingField),
}

fn candidate_strategy() -> impl Strategy<Value = Candidate> {
    (0..TITLES.len(), any::<bool>(), any::<bool>()).prop_map(|(title, has_url, has_year)| Candidate {
        url: if has_url { "https://example.org".to_string() } else { String::new() },
        year: has_year.then_some(2020),
        ..Candidate::titled(TITLES[title])
    })
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..12usize).prop_map(Step::ScreenInclude),
        (0..12usize).prop_map(Step::ScreenExclude),
        (0..12usize).prop_map(Step::EligibilityInclude),
        (0..12usize, prop_oneof![Just("Poor methodology"), Just("other"), Just("")])
            .prop_map(|(i, reason)| Step::EligibilityExclude(i, reason)),
        Just(Step::Dedup),
        prop_oneof![Just(MissingField::Url), Just(MissingField::Year), Just(MissingField::Title)]
            .prop_map(Step::Remove),
    ]
}

fn setup(candidates: Vec<Candidate>) -> (WorkflowEngine, ProjectWorkflowState, Vec<String>) {
    let engine = WorkflowEngine::default_config();
    let mut state = ProjectWorkflowState::new("prop", engine.config());
    let ids = engine
        .ingest_records(&mut state, candidates)
        .unwrap()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    (engine, state, ids)
}

fn apply(engine: &WorkflowEngine, state: &mut ProjectWorkflowState, ids: &[String], step: &Step) {
    let id = |i: &usize| ids[*i % ids.len()].as_str();
    let before = state.clone();

    let result = match step {
        Step::ScreenInclude(i) => engine.screen_include(state, id(i)).map(|_| ()),
        Step::ScreenExclude(i) => engine.screen_exclude(state, id(i)).map(|_| ()),
        Step::EligibilityInclude(i) => engine.eligibility_include(state, id(i)).map(|_| ()),
        Step::EligibilityExclude(i, reason) => engine.eligibility_exclude(state, id(i), reason).map(|_| ()),
        Step::Dedup => {
            engine.mark_duplicates(state);
            Ok(())
        }
        Step::Remove(field) => {
            engine.remove_incomplete(state, *field);
            Ok(())
        }
    };

    if result.is_err() {
        assert_eq!(*state, before, "rejected {:?} changed the state", step);
    }
}

proptest! {
    #[test]
    fn test_counts_reconcile_after_any_sequence(
        candidates in prop::collection::vec(candidate_strategy(), 1..12),
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let (engine, mut state, ids) = setup(candidates);
        for step in &steps {
            apply(&engine, &mut state, &ids, step);
            let report = FlowCounter::for_state(&state).compute(state.records());
            prop_assert_eq!(report.identified, ids.len());
            prop_assert!(report.is_reconciled());
        }
    }

    #[test]
    fn test_mark_duplicates_idempotent(candidates in prop::collection::vec(candidate_strategy(), 0..12)) {
        let (engine, mut state, _) = setup(candidates);
        engine.mark_duplicates(&mut state);
        let once = state.clone();
        let second = engine.mark_duplicates(&mut state);
        prop_assert!(second.changes.is_empty());
        prop_assert_eq!(state, once);
    }

    #[test]
    fn test_earliest_in_cluster_stays_canonical(candidates in prop::collection::vec(candidate_strategy(), 0..12)) {
        let (engine, mut state, _) = setup(candidates);
        let outcome = engine.mark_duplicates(&mut state);

        for found in &outcome.matches {
            let canonical = state.record(found.canonical.as_str()).unwrap();
            prop_assert_ne!(canonical.status().tag(), StatusTag::Duplicate);

            let canonical_index = state.records().position(|r| r.id == found.canonical).unwrap();
            let duplicate_index = state.records().position(|r| r.id == found.duplicate).unwrap();
            prop_assert!(canonical_index < duplicate_index);
        }
    }

    #[test]
    fn test_remove_incomplete_idempotent(
        candidates in prop::collection::vec(candidate_strategy(), 0..12),
        field in prop_oneof![Just(MissingField::Url), Just(MissingField::Year), Just(MissingField::Title)],
    ) {
        let (engine, mut state, _) = setup(candidates);
        engine.remove_incomplete(&mut state, field);
        let once = state.clone();
        prop_assert!(engine.remove_incomplete(&mut state, field).is_empty());
        prop_assert_eq!(state, once);
    }
}
