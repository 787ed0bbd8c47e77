use super::actions::toggle_diagnosis;
use super::actions::RuntimeAction;
use super::actions::StudyAction;
use super::actions::UserAction;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::ScenarioState;
use super::state::ScenarioUpdate;
use super::state::StudyState;
use super::state::TransitionRequest;
use super::state::CERTAINTY_MAX;
use super::state::CERTAINTY_MIN;

#[derive(Debug, Clone, PartialEq)]
pub enum StudyEffect {
    RequestFrame,
    SubmitTransition(TransitionRequest),
}

pub fn reduce(state: &mut StudyState, action: StudyAction) -> Vec<StudyEffect> {
    if let Some(reason) = rejection(state, &action) {
        let label = match &action {
            StudyAction::User(user) => user.label(),
            StudyAction::Runtime(_) => "runtime",
        };
        log(
            state,
            LogLevel::Warn,
            LogSource::Reducer,
            format!("ignored {label}: {reason}"),
        );
        return Vec::new();
    }

    match action {
        StudyAction::User(user) => reduce_user(state, user),
        StudyAction::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            Vec::new()
        }
    }
}

/// Phase guard. Returns why an action cannot apply to the current round, or
/// `None` when the slice reducers may run.
pub fn rejection(state: &StudyState, action: &StudyAction) -> Option<&'static str> {
    let ui = &state.ui_status;
    match action {
        StudyAction::User(user) => match user {
            UserAction::PlayVideo { .. } => {
                if ui.awaiting_response {
                    Some("waiting for the robot")
                } else if ui.video_playing {
                    Some("video is already playing")
                } else if ui.video_loaded_time.is_some() {
                    Some("video already shown this round")
                } else {
                    None
                }
            }
            UserAction::DisplayState { .. } => {
                if !ui.video_loaded {
                    Some("video has not started")
                } else {
                    None
                }
            }
            UserAction::ToggleDiagnosis(diagnosis) => {
                if ui.awaiting_response || ui.video_playing {
                    Some("diagnoses are locked")
                } else if ui.diagnoses_confirmed() {
                    Some("diagnoses already confirmed")
                } else if !state.config.catalog.has_diagnosis(diagnosis) {
                    Some("unknown diagnosis")
                } else {
                    None
                }
            }
            UserAction::ConfirmDiagnoses { diagnoses, .. } => {
                if ui.awaiting_response || ui.video_playing {
                    Some("diagnoses are locked")
                } else if ui.scenario_completed {
                    Some("scenario is complete")
                } else if ui.diagnoses_confirmed() {
                    Some("diagnoses already confirmed")
                } else if state.history.ax_to_add.is_some() {
                    Some("previous round not yet recorded")
                } else if diagnoses.is_empty() {
                    Some("no diagnosis selected")
                } else if !diagnoses
                    .iter()
                    .all(|diagnosis| state.config.catalog.has_diagnosis(diagnosis))
                {
                    Some("unknown diagnosis")
                } else {
                    None
                }
            }
            UserAction::AdjustCertainty(_) => {
                if !ui.diagnoses_confirmed() {
                    Some("diagnoses not confirmed")
                } else if ui.certainty_confirmed() {
                    Some("certainty already confirmed")
                } else {
                    None
                }
            }
            UserAction::ConfirmCertainty { certainty } => {
                if !ui.diagnoses_confirmed() {
                    Some("diagnoses not confirmed")
                } else if ui.certainty_confirmed() {
                    Some("certainty already confirmed")
                } else if !(CERTAINTY_MIN..=CERTAINTY_MAX).contains(certainty) {
                    Some("certainty out of range")
                } else {
                    None
                }
            }
            UserAction::SelectAction { action, .. } => {
                if ui.awaiting_response {
                    Some("a request is already outstanding")
                } else if ui.scenario_completed {
                    Some("scenario is complete")
                } else if ui.video_playing {
                    Some("video is still playing")
                } else if !ui.diagnoses_confirmed() {
                    Some("diagnoses not confirmed")
                } else if !state.scenario_state.valid_actions.contains(action) {
                    Some("action is not valid in this state")
                } else {
                    None
                }
            }
            UserAction::RetryTransition => {
                if ui.transition_error.is_none() || state.outbox.is_none() {
                    Some("no failed request to resend")
                } else {
                    None
                }
            }
            UserAction::CompleteScenario => None,
        },
        StudyAction::Runtime(RuntimeAction::TransitionFailed { .. }) => {
            if !ui.awaiting_response {
                Some("no request in flight")
            } else {
                None
            }
        }
        StudyAction::Runtime(_) => None,
    }
}

fn reduce_user(state: &mut StudyState, action: UserAction) -> Vec<StudyEffect> {
    match action {
        UserAction::PlayVideo { at } => {
            let ui = &mut state.ui_status;
            ui.video_loaded_time = Some(ui.stamp(at));
            ui.video_loaded = true;
            ui.video_playing = true;
            vec![StudyEffect::RequestFrame]
        }
        UserAction::DisplayState { at } => {
            let ui = &mut state.ui_status;
            ui.video_playing = false;
            if ui.video_stop_time.is_none() {
                ui.video_stop_time = Some(ui.stamp(at));
            }
            if state.history.commit_staged() {
                let recorded = state.history.len();
                log(
                    state,
                    LogLevel::Info,
                    LogSource::Reducer,
                    format!("round {recorded} added to history"),
                );
            } else if let Some(action) = state.history.discard_previous_round() {
                log(
                    state,
                    LogLevel::Warn,
                    LogSource::Reducer,
                    format!("round for {action} had no result; not recorded"),
                );
            }
            vec![StudyEffect::RequestFrame]
        }
        UserAction::ToggleDiagnosis(diagnosis) => {
            let order = state.config.catalog.diagnosis_order();
            state.ui_status.selected_dx =
                toggle_diagnosis(&state.ui_status.selected_dx, &diagnosis, &order);
            vec![StudyEffect::RequestFrame]
        }
        UserAction::ConfirmDiagnoses { diagnoses, at } => {
            let ui = &mut state.ui_status;
            ui.dx_selected_time = Some(ui.stamp(at));
            ui.selected_dx = diagnoses.clone();
            ui.confirmed_dx = diagnoses.clone();
            state.history.dx_to_add = Some(diagnoses);
            vec![StudyEffect::RequestFrame]
        }
        UserAction::AdjustCertainty(delta) => {
            let ui = &mut state.ui_status;
            let next = i16::from(ui.certainty_draft) + i16::from(delta);
            ui.certainty_draft =
                next.clamp(i16::from(CERTAINTY_MIN), i16::from(CERTAINTY_MAX)) as u8;
            vec![StudyEffect::RequestFrame]
        }
        UserAction::ConfirmCertainty { certainty } => {
            let ui = &mut state.ui_status;
            ui.certainty_draft = certainty;
            ui.dx_certainty = Some(certainty);
            vec![StudyEffect::RequestFrame]
        }
        UserAction::SelectAction { action, at } => {
            let ui = &mut state.ui_status;
            ui.ax_selected_time = Some(ui.stamp(at));
            ui.selected_action = Some(action.clone());
            ui.selected_action_idx += 1;
            ui.video_loaded = false;
            ui.video_playing = false;
            ui.selected_dx.clear();
            ui.confirmed_dx.clear();
            ui.awaiting_response = true;
            ui.transition_error = None;

            state.history.ax_to_add = Some(action.clone());
            state.history.result_to_add = None;

            let request = TransitionRequest {
                server_state_tuple: state.scenario_state.server_state_tuple.clone(),
                action: action.clone(),
                ui_state: state.ui_status.clone(),
            };
            state.outbox = Some(request.clone());
            log(
                state,
                LogLevel::Info,
                LogSource::Participant,
                format!("selected action {action}"),
            );
            vec![
                StudyEffect::SubmitTransition(request),
                StudyEffect::RequestFrame,
            ]
        }
        UserAction::RetryTransition => {
            state.ui_status.transition_error = None;
            let Some(request) = state.outbox.clone() else {
                return Vec::new();
            };
            log(
                state,
                LogLevel::Info,
                LogSource::Participant,
                format!("resending action {}", request.action),
            );
            vec![
                StudyEffect::SubmitTransition(request),
                StudyEffect::RequestFrame,
            ]
        }
        UserAction::CompleteScenario => {
            state.ui_status.scenario_completed = true;
            vec![StudyEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut StudyState, action: RuntimeAction) {
    match action {
        RuntimeAction::UpdateState(update) => {
            reduce_history_update(state, &update);
            let completes = update.completes_scenario();
            let kind = if update.is_full_snapshot() {
                "snapshot"
            } else {
                "partial update"
            };
            reduce_scenario_update(&mut state.scenario_state, update);

            state.ui_status = state.ui_status.next_round();
            state.outbox = None;
            if completes {
                state.ui_status.scenario_completed = true;
            }
            log(
                state,
                LogLevel::Info,
                LogSource::Orchestrator,
                format!("received {kind} from server"),
            );
        }
        RuntimeAction::TransitionFailed { message, at_ms } => {
            state.ui_status.transition_error = Some(message.clone());
            let round = state.round();
            state.logs.append(
                LogEntry::new(
                    LogLevel::Error,
                    LogSource::Orchestrator,
                    round,
                    format!("request failed: {message}"),
                )
                .at_ms(at_ms),
            );
        }
        RuntimeAction::AppendStructuredLog(entry) => state.logs.append(entry),
        RuntimeAction::ClearLogs => state.logs.clear(),
    }
}

/// A server snapshot replaces the scenario wholesale; anything else is
/// merged field by field over what is already there.
fn reduce_scenario_update(scenario: &mut ScenarioState, update: ScenarioUpdate) {
    if update.is_full_snapshot() {
        *scenario = ScenarioState::replaced_by(update);
    } else {
        scenario.merge(update);
    }
}

fn reduce_history_update(state: &mut StudyState, update: &ScenarioUpdate) {
    if state.history.ax_to_add.is_none() {
        return;
    }
    if let Some(result) = update.action_result {
        state.history.result_to_add = Some(result);
    }
}

fn log(state: &mut StudyState, level: LogLevel, source: LogSource, message: String) {
    let round = state.round();
    state
        .logs
        .append(LogEntry::new(level, source, round, message));
}

#[cfg(test)]
mod tests;
