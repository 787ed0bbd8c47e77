use super::*;
use pretty_assertions::assert_eq;

fn last_warning(state: &StudyState) -> Option<String> {
    state
        .logs
        .iter()
        .rev()
        .find(|entry| entry.level == LogLevel::Warn)
        .map(|entry| entry.message.clone())
}

#[test]
fn duplicate_confirm_diagnoses_is_ignored() {
    let mut state = state();
    watch_and_diagnose(&mut state, 1.0, &["lost"]);
    let stamped = state.ui_status.dx_selected_time;

    let effects = user(
        &mut state,
        UserAction::ConfirmDiagnoses {
            diagnoses: dx(&["battery_low"]),
            at: 30.0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.ui_status.confirmed_dx, dx(&["lost"]));
    assert_eq!(state.ui_status.dx_selected_time, stamped);
    assert_eq!(
        last_warning(&state).as_deref(),
        Some("ignored confirm-diagnoses: diagnoses already confirmed")
    );
}

#[test]
fn play_video_twice_keeps_first_stamp() {
    let mut state = state();
    user(&mut state, UserAction::PlayVideo { at: 5.0 });
    let effects = user(&mut state, UserAction::PlayVideo { at: 6.0 });

    assert!(effects.is_empty());
    assert_eq!(state.ui_status.video_loaded_time, Some(5.0));

    user(&mut state, UserAction::DisplayState { at: 9.0 });
    user(&mut state, UserAction::PlayVideo { at: 10.0 });
    assert_eq!(state.ui_status.video_loaded_time, Some(5.0));
    assert!(!state.ui_status.video_playing);
}

#[test]
fn display_state_before_playback_is_ignored() {
    let mut state = state();
    let effects = user(&mut state, UserAction::DisplayState { at: 1.0 });
    assert!(effects.is_empty());
    assert_eq!(state.ui_status.video_stop_time, None);
}

#[test]
fn diagnoses_locked_while_video_plays() {
    let mut state = state();
    user(&mut state, UserAction::PlayVideo { at: 1.0 });
    user(&mut state, UserAction::ToggleDiagnosis(DiagnosisId::new("lost")));
    assert!(state.ui_status.selected_dx.is_empty());
}

#[test]
fn unknown_diagnosis_and_empty_confirm_are_rejected() {
    let mut state = state();
    user(&mut state, UserAction::PlayVideo { at: 1.0 });
    user(&mut state, UserAction::DisplayState { at: 2.0 });

    user(
        &mut state,
        UserAction::ToggleDiagnosis(DiagnosisId::new("gremlins")),
    );
    assert!(state.ui_status.selected_dx.is_empty());

    let reason = rejection(
        &state,
        &StudyAction::User(UserAction::ConfirmDiagnoses {
            diagnoses: Vec::new(),
            at: 3.0,
        }),
    );
    assert_eq!(reason, Some("no diagnosis selected"));
}

#[test]
fn certainty_requires_confirmed_diagnoses_and_scale() {
    let mut state = state();
    let reason = rejection(
        &state,
        &StudyAction::User(UserAction::ConfirmCertainty { certainty: 3 }),
    );
    assert_eq!(reason, Some("diagnoses not confirmed"));

    user(&mut state, UserAction::PlayVideo { at: 1.0 });
    user(&mut state, UserAction::DisplayState { at: 2.0 });
    user(
        &mut state,
        UserAction::ConfirmDiagnoses {
            diagnoses: dx(&["lost"]),
            at: 3.0,
        },
    );
    user(&mut state, UserAction::ConfirmCertainty { certainty: 9 });
    assert_eq!(state.ui_status.dx_certainty, None);
}

#[test]
fn invalid_action_is_not_submitted() {
    let mut state = state();
    watch_and_diagnose(&mut state, 1.0, &["lost"]);
    let effects = user(
        &mut state,
        UserAction::SelectAction {
            action: ActionId::new("pick_jug"),
            at: 9.0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.ui_status.selected_action_idx, 0);
    assert_eq!(state.outbox, None);
    assert_eq!(
        last_warning(&state).as_deref(),
        Some("ignored select-action: action is not valid in this state")
    );
}

#[test]
fn second_select_while_awaiting_is_ignored() {
    let mut state = state();
    watch_and_diagnose(&mut state, 1.0, &["lost"]);
    user(
        &mut state,
        UserAction::SelectAction {
            action: ActionId::new("look_at_dt"),
            at: 9.0,
        },
    );
    let effects = user(
        &mut state,
        UserAction::SelectAction {
            action: ActionId::new("go_to_c"),
            at: 10.0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.ui_status.selected_action_idx, 1);
    assert_eq!(
        state.ui_status.selected_action,
        Some(ActionId::new("look_at_dt"))
    );
}

#[test]
fn nothing_is_submitted_after_completion() {
    let mut state = state();
    watch_and_diagnose(&mut state, 1.0, &["none"]);
    user(&mut state, UserAction::CompleteScenario);
    let effects = user(
        &mut state,
        UserAction::SelectAction {
            action: ActionId::new("place"),
            at: 9.0,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.outbox, None);
}

#[test]
fn stale_failure_is_ignored() {
    let mut state = state();
    run_runtime(
        &mut state,
        RuntimeAction::TransitionFailed {
            message: "timeout".to_string(),
            at_ms: 1,
        },
    );
    assert_eq!(state.ui_status.transition_error, None);
    assert!(state
        .logs
        .iter()
        .all(|entry| entry.level != LogLevel::Error));
}

#[test]
fn confirm_waits_until_previous_round_is_recorded() {
    let mut state = state();
    complete_round(&mut state, 1.0, "look_at_dt", true);
    assert_eq!(state.phase(), RoundPhase::Idle);

    let effects = user(
        &mut state,
        UserAction::ConfirmDiagnoses {
            diagnoses: dx(&["battery_low"]),
            at: 20.0,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.history.dx_to_add, Some(dx(&["lost"])));
    assert_eq!(
        last_warning(&state).as_deref(),
        Some("ignored confirm-diagnoses: previous round not yet recorded")
    );

    user(&mut state, UserAction::PlayVideo { at: 21.0 });
    user(&mut state, UserAction::DisplayState { at: 26.0 });
    let entries = state.history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].errors, dx(&["lost"]));
    assert_eq!(entries[0].action, ActionId::new("look_at_dt"));
}

#[test]
fn select_requires_confirmed_diagnoses() {
    let mut state = state();
    let effects = user(
        &mut state,
        UserAction::SelectAction {
            action: ActionId::new("look_at_dt"),
            at: 1.0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.ui_status.selected_action_idx, 0);
    assert_eq!(state.outbox, None);
    assert_eq!(state.history.ax_to_add, None);
    assert_eq!(
        last_warning(&state).as_deref(),
        Some("ignored select-action: diagnoses not confirmed")
    );

    user(&mut state, UserAction::PlayVideo { at: 2.0 });
    user(&mut state, UserAction::DisplayState { at: 3.0 });
    let reason = rejection(
        &state,
        &StudyAction::User(UserAction::SelectAction {
            action: ActionId::new("look_at_dt"),
            at: 4.0,
        }),
    );
    assert_eq!(reason, Some("diagnoses not confirmed"));
}

#[test]
fn every_recorded_round_pairs_its_own_diagnosis_and_action() {
    let mut state = state();
    let rounds = [
        (1.0, "lost", "look_at_dt", true),
        (40.0, "cannot_see", "go_to_kc", false),
        (80.0, "battery_low", "look_at_dt", true),
    ];
    for (start, diagnosis, action, result) in rounds {
        watch_and_diagnose(&mut state, start, &[diagnosis]);
        user(
            &mut state,
            UserAction::SelectAction {
                action: ActionId::new(action),
                at: start + 10.0,
            },
        );
        run_runtime(
            &mut state,
            RuntimeAction::UpdateState(full_snapshot(&format!("t{start}"), result)),
        );
        // A confirm ahead of the next video must not leak into this round.
        user(
            &mut state,
            UserAction::ConfirmDiagnoses {
                diagnoses: dx(&["none"]),
                at: start + 11.0,
            },
        );
    }
    user(&mut state, UserAction::PlayVideo { at: 120.0 });
    user(&mut state, UserAction::DisplayState { at: 125.0 });

    let recorded: Vec<(Vec<DiagnosisId>, &str, bool)> = state
        .history
        .entries()
        .iter()
        .map(|entry| (entry.errors.clone(), entry.action.as_str(), entry.result))
        .collect();
    assert_eq!(
        recorded,
        vec![
            (dx(&["lost"]), "look_at_dt", true),
            (dx(&["cannot_see"]), "go_to_kc", false),
            (dx(&["battery_low"]), "look_at_dt", true),
        ]
    );
}
