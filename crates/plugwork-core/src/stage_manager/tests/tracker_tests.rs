use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{Stage, StageTracker};
use std::str::FromStr;

#[test]
fn test_new_tracker_has_nothing_done() {
    let tracker = StageTracker::new();
    for stage in Stage::ALL {
        assert!(!tracker.is_done(stage));
    }
    assert!(tracker.completed().is_empty());
}

#[test]
fn test_begin_marks_stage_done() {
    let mut tracker = StageTracker::new();
    tracker.begin(Stage::LoadPlugins).expect("first begin should succeed");
    assert!(tracker.is_done(Stage::LoadPlugins));
    assert!(!tracker.is_done(Stage::Bootstrap));
}

#[test]
fn test_begin_twice_fails() {
    let mut tracker = StageTracker::new();
    tracker.begin(Stage::Finalize).unwrap();
    match tracker.begin(Stage::Finalize) {
        Err(StageSystemError::StageAlreadyDone { stage }) => assert_eq!(stage, Stage::Finalize),
        other => panic!("Expected StageAlreadyDone, got {:?}", other),
    }
}

#[test]
fn test_already_done_message_names_stage() {
    let err = StageSystemError::StageAlreadyDone { stage: Stage::LoadPlugins };
    assert_eq!(err.to_string(), "API.load_plugins() already called");
}

#[test]
fn test_completed_is_in_execution_order() {
    let mut tracker = StageTracker::new();
    tracker.begin(Stage::Finalize).unwrap();
    tracker.begin(Stage::Bootstrap).unwrap();
    assert_eq!(tracker.completed(), vec![Stage::Bootstrap, Stage::Finalize]);
}

#[test]
fn test_stage_names_and_predecessors() {
    assert_eq!(Stage::Bootstrap.to_string(), "bootstrap");
    assert_eq!(Stage::LoadPlugins.to_string(), "load_plugins");
    assert_eq!(Stage::Finalize.to_string(), "finalize");

    assert_eq!(Stage::Bootstrap.predecessor(), None);
    assert_eq!(Stage::LoadPlugins.predecessor(), Some(Stage::Bootstrap));
    assert_eq!(Stage::Finalize.predecessor(), Some(Stage::LoadPlugins));
}

#[test]
fn test_stage_from_str() {
    assert_eq!(Stage::from_str("load_plugins").unwrap(), Stage::LoadPlugins);
    assert!(matches!(
        Stage::from_str("shutdown"),
        Err(StageSystemError::UnknownStage { ref name }) if name == "shutdown"
    ));
}
