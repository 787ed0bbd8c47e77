use pretty_assertions::assert_eq;
use serde_json::json;

pub(super) use super::reduce;
pub(super) use super::rejection;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::StudyAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::StudyConfig;
pub(super) use crate::reducer::StudyEffect;
pub(super) use crate::state::ActionId;
pub(super) use crate::state::DiagnosisId;
pub(super) use crate::state::LogEntry;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::LogSource;
pub(super) use crate::state::RoundPhase;
pub(super) use crate::state::ScenarioUpdate;
pub(super) use crate::state::StudyState;

mod guards;
mod scenario_state;

fn state() -> StudyState {
    StudyState::new(StudyConfig::default())
}

fn dx(ids: &[&str]) -> Vec<DiagnosisId> {
    ids.iter().map(|id| DiagnosisId::new(*id)).collect()
}

fn user(state: &mut StudyState, action: UserAction) -> Vec<StudyEffect> {
    reduce(state, StudyAction::User(action))
}

fn run_runtime(state: &mut StudyState, action: RuntimeAction) {
    let effects = reduce(state, StudyAction::Runtime(action));
    assert!(effects.is_empty());
}

fn update(value: serde_json::Value) -> ScenarioUpdate {
    serde_json::from_value(value).expect("scenario update")
}

fn full_snapshot(tuple: &str, action_result: bool) -> ScenarioUpdate {
    update(json!({
        "server_state_tuple": tuple,
        "video_link": format!("https://videos.example/{tuple}.mp4"),
        "robot_beliefs": [{"attr": "Location", "value": "Couch"}],
        "valid_actions": {"go_to_kc": true, "look_at_dt": true, "place": false},
        "dx_suggestions": ["lost"],
        "ax_suggestions": ["go_to_kc"],
        "action_result": action_result,
    }))
}

/// Plays the current video to the end, then confirms `diagnoses` and a
/// certainty of 3.
fn watch_and_diagnose(state: &mut StudyState, start: f64, diagnoses: &[&str]) {
    user(state, UserAction::PlayVideo { at: start });
    user(state, UserAction::DisplayState { at: start + 5.0 });
    user(
        state,
        UserAction::ConfirmDiagnoses {
            diagnoses: dx(diagnoses),
            at: start + 8.0,
        },
    );
    user(state, UserAction::ConfirmCertainty { certainty: 3 });
}

/// One complete round: watch, diagnose, choose `action`, receive the
/// server's snapshot.
fn complete_round(state: &mut StudyState, start: f64, action: &str, result: bool) {
    watch_and_diagnose(state, start, &["lost"]);
    user(
        state,
        UserAction::SelectAction {
            action: ActionId::new(action),
            at: start + 10.0,
        },
    );
    run_runtime(
        state,
        RuntimeAction::UpdateState(full_snapshot(&format!("t{start}"), result)),
    );
}

fn assert_round_reset(state: &StudyState) {
    assert!(!state.ui_status.video_loaded);
    assert!(!state.ui_status.video_playing);
    assert_eq!(state.ui_status.confirmed_dx, Vec::<DiagnosisId>::new());
}
