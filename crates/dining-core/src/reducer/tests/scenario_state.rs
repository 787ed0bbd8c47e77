use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn snapshot_with_tuple_replaces_every_field() {
    let mut state = state();
    assert!(!state.scenario_state.robot_beliefs.is_empty());

    run_runtime(
        &mut state,
        RuntimeAction::UpdateState(update(json!({
            "server_state_tuple": "abc",
            "video_link": "https://videos.example/abc.mp4",
        }))),
    );

    let scenario = &state.scenario_state;
    assert_eq!(scenario.server_state_tuple, json!("abc"));
    assert_eq!(scenario.video_link, "https://videos.example/abc.mp4");
    assert!(scenario.robot_beliefs.is_empty());
    assert!(scenario.valid_actions.is_empty());
    assert!(scenario.dx_suggestions.is_empty());
    assert!(scenario.ax_suggestions.is_empty());
    assert_eq!(scenario.action_result, None);
}

#[test]
fn update_without_tuple_merges_over_prior_fields() {
    let mut state = state();
    let before = state.scenario_state.clone();

    run_runtime(
        &mut state,
        RuntimeAction::UpdateState(update(json!({
            "dx_suggestions": ["lost", "battery_low"],
        }))),
    );

    let scenario = &state.scenario_state;
    assert_eq!(scenario.dx_suggestions, dx(&["lost", "battery_low"]));
    assert_eq!(scenario.video_link, before.video_link);
    assert_eq!(scenario.robot_beliefs, before.robot_beliefs);
    assert_eq!(scenario.valid_actions, before.valid_actions);
    assert_eq!(scenario.server_state_tuple, before.server_state_tuple);
}

#[test]
fn any_update_starts_a_fresh_round() {
    let mut state = state();
    user(&mut state, UserAction::PlayVideo { at: 1.0 });
    user(&mut state, UserAction::DisplayState { at: 2.0 });
    user(&mut state, UserAction::ToggleDiagnosis(DiagnosisId::new("lost")));

    run_runtime(
        &mut state,
        RuntimeAction::UpdateState(update(json!({"ax_suggestions": ["go_to_c"]}))),
    );

    assert!(!state.ui_status.video_loaded);
    assert!(state.ui_status.selected_dx.is_empty());
    assert_eq!(state.ui_status.video_loaded_time, None);
    assert_eq!(
        state.scenario_state.ax_suggestions,
        vec![ActionId::new("go_to_c")]
    );
}

#[test]
fn valid_actions_list_shape_is_normalized() {
    let mut state = state();
    run_runtime(
        &mut state,
        RuntimeAction::UpdateState(update(json!({
            "server_state_tuple": ["kc", "dt"],
            "valid_actions": ["go_to_dt", "look_at_kc"],
        }))),
    );
    let valid: Vec<&str> = state
        .scenario_state
        .valid_actions
        .iter_valid()
        .map(ActionId::as_str)
        .collect();
    assert_eq!(valid, vec!["go_to_dt", "look_at_kc"]);
}

#[test]
fn scenario_reducer_ignores_participant_actions() {
    let mut state = state();
    let before = state.scenario_state.clone();
    watch_and_diagnose(&mut state, 1.0, &["lost"]);
    assert_eq!(state.scenario_state, before);
}
