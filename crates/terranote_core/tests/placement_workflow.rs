mod support;

use support::{deterministic_store, position, MemoryStorage, RecordingRenderer};
use terranote_core::workflow::placement::SURFACE_FALLBACK_LIFT;
use terranote_core::{
    ActivationError, CommitOutcome, PickOutcome, PlacementState, PlacementWorkflow, ScreenPoint,
};

const CLICK: ScreenPoint = ScreenPoint { x: 400.0, y: 300.0 };

#[test]
fn activate_requires_author_and_scene() {
    let mut workflow = PlacementWorkflow::new();

    assert_eq!(
        workflow.activate("   ", "Lock A"),
        Err(ActivationError::MissingAuthor)
    );
    assert_eq!(workflow.state(), PlacementState::Inactive);

    assert_eq!(
        workflow.activate("Anna", ""),
        Err(ActivationError::NoActiveScene)
    );
    assert_eq!(workflow.state(), PlacementState::Inactive);

    workflow.activate("Anna", "Lock A").unwrap();
    assert_eq!(workflow.state(), PlacementState::AwaitingPosition);
}

#[test]
fn pick_without_feature_uses_bare_ground_position() {
    let renderer = RecordingRenderer::new();
    renderer.set_ground(Some(position(10.0, 20.0, 0.5)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();

    let outcome = workflow.on_scene_pick(&renderer, CLICK);
    assert_eq!(outcome, PickOutcome::PositionChosen { feature_name: None });
    assert_eq!(workflow.state(), PlacementState::PositionChosen);
    assert_eq!(workflow.pending_position(), Some(position(10.0, 20.0, 0.5)));
}

#[test]
fn feature_pick_prefers_surface_position() {
    let renderer = RecordingRenderer::new();
    renderer.set_feature("Gate West");
    renderer.set_surface(Some(position(1.0, 2.0, 3.0)));
    renderer.set_ground(Some(position(9.0, 9.0, 9.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();

    let outcome = workflow.on_scene_pick(&renderer, CLICK);
    assert_eq!(
        outcome,
        PickOutcome::PositionChosen {
            feature_name: Some("Gate West".to_string())
        }
    );
    assert_eq!(workflow.pending_position(), Some(position(1.0, 2.0, 3.0)));
}

#[test]
fn feature_pick_falls_back_to_lifted_ground_position() {
    let renderer = RecordingRenderer::new();
    renderer.set_feature("Gate West");
    renderer.set_surface(None);
    renderer.set_ground(Some(position(10.0, 20.0, 1.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();

    workflow.on_scene_pick(&renderer, CLICK);
    assert_eq!(
        workflow.pending_position(),
        Some(position(10.0, 20.0, 1.0 + SURFACE_FALLBACK_LIFT))
    );
}

#[test]
fn unresolvable_pick_keeps_the_workflow_armed() {
    let renderer = RecordingRenderer::new();

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();

    let outcome = workflow.on_scene_pick(&renderer, CLICK);
    assert_eq!(outcome, PickOutcome::InvalidPosition);
    assert_eq!(workflow.state(), PlacementState::AwaitingPosition);
    assert_eq!(workflow.pending_position(), None);
}

#[test]
fn pick_is_ignored_unless_awaiting_position() {
    let renderer = RecordingRenderer::new();
    renderer.set_ground(Some(position(1.0, 1.0, 1.0)));

    let mut workflow = PlacementWorkflow::new();
    assert_eq!(workflow.on_scene_pick(&renderer, CLICK), PickOutcome::NotArmed);

    workflow.activate("Anna", "Lock A").unwrap();
    workflow.on_scene_pick(&renderer, CLICK);
    assert_eq!(workflow.state(), PlacementState::PositionChosen);
    // A second click while the text dialog is open must not re-resolve.
    assert_eq!(workflow.on_scene_pick(&renderer, CLICK), PickOutcome::NotArmed);
}

#[test]
fn empty_text_commit_keeps_state_and_touches_no_store() {
    let storage = MemoryStorage::new();
    let (mut store, _clock) = deterministic_store(&storage);
    let renderer = RecordingRenderer::new();
    renderer.set_ground(Some(position(1.0, 2.0, 3.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();
    workflow.on_scene_pick(&renderer, CLICK);

    let outcome = workflow.commit(&mut store, "   ").unwrap();

    assert_eq!(outcome, CommitOutcome::EmptyText);
    assert_eq!(workflow.state(), PlacementState::PositionChosen);
    assert_eq!(store.get_stats().comment_count, 0);
    assert_eq!(storage.saves.get(), 0);
}

#[test]
fn commit_without_position_is_a_no_op() {
    let storage = MemoryStorage::new();
    let (mut store, _clock) = deterministic_store(&storage);

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();

    let outcome = workflow.commit(&mut store, "text").unwrap();
    assert_eq!(outcome, CommitOutcome::NoPendingPosition);
    assert_eq!(workflow.state(), PlacementState::AwaitingPosition);
    assert_eq!(store.get_stats().comment_count, 0);
}

#[test]
fn successful_commit_persists_and_resets_to_inactive() {
    let storage = MemoryStorage::new();
    let (mut store, _clock) = deterministic_store(&storage);
    let renderer = RecordingRenderer::new();
    renderer.set_feature("Gate West");
    renderer.set_surface(Some(position(10.0, 20.0, 5.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();
    workflow.on_scene_pick(&renderer, CLICK);

    let outcome = workflow.commit(&mut store, "Leak at joint").unwrap();
    let CommitOutcome::Committed(record) = outcome else {
        panic!("expected a committed record");
    };

    assert_eq!(record.scene_key, "Lock A");
    assert_eq!(record.author, "Anna");
    assert_eq!(record.feature_name.as_deref(), Some("Gate West"));
    assert_eq!(record.position, position(10.0, 20.0, 5.0));
    assert_eq!(workflow.state(), PlacementState::Inactive);
    assert_eq!(workflow.pending_position(), None);
    assert_eq!(store.comments_for_scene("Lock A").len(), 1);
}

#[test]
fn failed_store_write_keeps_the_chosen_position_for_retry() {
    let storage = MemoryStorage::new();
    let (mut store, _clock) = deterministic_store(&storage);
    let renderer = RecordingRenderer::new();
    renderer.set_ground(Some(position(1.0, 2.0, 3.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();
    workflow.on_scene_pick(&renderer, CLICK);

    storage.fail_saves.set(true);
    assert!(workflow.commit(&mut store, "text").is_err());
    assert_eq!(workflow.state(), PlacementState::PositionChosen);

    storage.fail_saves.set(false);
    let retry = workflow.commit(&mut store, "text").unwrap();
    assert!(matches!(retry, CommitOutcome::Committed(_)));
}

#[test]
fn cancel_and_deactivate_clear_pending_state() {
    let renderer = RecordingRenderer::new();
    renderer.set_ground(Some(position(1.0, 2.0, 3.0)));

    let mut workflow = PlacementWorkflow::new();
    workflow.activate("Anna", "Lock A").unwrap();
    workflow.on_scene_pick(&renderer, CLICK);
    workflow.cancel();
    assert_eq!(workflow.state(), PlacementState::Inactive);
    assert_eq!(workflow.pending_position(), None);

    workflow.activate("Anna", "Lock A").unwrap();
    workflow.deactivate();
    assert_eq!(workflow.state(), PlacementState::Inactive);
}
