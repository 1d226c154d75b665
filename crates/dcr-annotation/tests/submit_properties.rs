//! Manual Entry Properties
//!
//! Random edit sequences on one tooth: submit accepts exactly the complete
//! entries and recorded conditions always combine.

use dcr_annotation::{AnnotationError, ManualAnnotationEngine};
use dcr_chart::{Condition, Presence, ToothChart};
use dcr_test_utils::tooth;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Presence(Presence),
    Add(Condition),
    Remove(Condition),
    Clear,
}

fn any_condition() -> impl Strategy<Value = Condition> {
    proptest::sample::select(Condition::ALL.to_vec())
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => prop_oneof![
            Just(Presence::Unset),
            Just(Presence::Present),
            Just(Presence::Missing),
        ]
        .prop_map(Step::Presence),
        3 => any_condition().prop_map(Step::Add),
        1 => any_condition().prop_map(Step::Remove),
        1 => Just(Step::Clear),
    ]
}

fn apply(engine: &mut ManualAnnotationEngine<'_>, step: Step) {
    let code = tooth("26");
    // rejected edits leave the tooth as it was
    let _ = match step {
        Step::Presence(p) => engine.record_presence(code, p),
        Step::Add(c) => engine.record_condition(code, c),
        Step::Remove(c) => engine.remove_condition(code, c),
        Step::Clear => engine.clear(code),
    };
}

proptest! {
    #[test]
    fn prop_submit_accepts_only_complete_entries(steps in prop::collection::vec(any_step(), 0..24)) {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        for step in steps {
            apply(&mut engine, step);
        }

        let before = engine.select_tooth(tooth("26")).unwrap();
        let complete = match before.presence {
            Presence::Missing => true,
            Presence::Present => !before.manual_conditions().is_empty(),
            Presence::Unset => false,
        };

        let result = engine.submit(tooth("26"));
        let after = engine.select_tooth(tooth("26")).unwrap();
        if complete {
            prop_assert!(result.is_ok());
            prop_assert!(after.submitted);
        } else {
            let incomplete = matches!(result, Err(AnnotationError::IncompleteAnnotation { .. }));
            prop_assert!(incomplete);
            prop_assert!(!after.submitted);
        }
    }

    #[test]
    fn prop_recorded_conditions_always_compatible(steps in prop::collection::vec(any_step(), 0..24)) {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        for step in steps {
            apply(&mut engine, step);
            let current = engine.select_tooth(tooth("26")).unwrap();
            let conditions = current.manual_conditions();
            prop_assert!(conditions.check().is_ok());
            if current.presence != Presence::Present {
                prop_assert!(conditions.is_empty());
            }
        }
    }
}
