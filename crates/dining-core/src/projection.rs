use super::state::ActionId;
use super::state::DiagnosisId;
use super::state::RobotBelief;
use super::state::RoundPhase;
use super::state::StudyState;

/// Belief attributes that describe the robot while it is moving; they are
/// shown during playback and hidden once the video stops.
pub const SHOW_IN_VIDEO_ATTRS: &[&str] = &["Arm status"];

/// What each panel of the participant view may do on this render. Derived
/// from the store every frame, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelProjection {
    pub phase: RoundPhase,
    pub communicating: bool,
    pub diagnosis_enabled: bool,
    pub certainty_visible: bool,
    pub certainty_enabled: bool,
    pub actions_visible: bool,
    pub actions_locked: bool,
    pub show_dx_suggestions: bool,
    pub show_ax_suggestions: bool,
    pub completion_visible: bool,
    pub retry_available: bool,
}

pub fn project_panels(state: &StudyState) -> PanelProjection {
    let ui = &state.ui_status;
    let condition = state.config.condition;
    let video_done = ui.video_finished();

    PanelProjection {
        phase: state.phase(),
        communicating: !ui.video_loaded || ui.awaiting_response,
        diagnosis_enabled: video_done && !ui.diagnoses_confirmed() && !ui.awaiting_response,
        certainty_visible: video_done && ui.diagnoses_confirmed(),
        certainty_enabled: video_done && ui.diagnoses_confirmed() && !ui.certainty_confirmed(),
        actions_visible: video_done && ui.diagnoses_confirmed() && ui.certainty_confirmed(),
        actions_locked: ui.awaiting_response || ui.selected_action.is_some(),
        show_dx_suggestions: condition.show_dx_suggestions,
        show_ax_suggestions: condition.show_ax_suggestions,
        completion_visible: ui.scenario_completed && video_done,
        retry_available: ui.transition_error.is_some() && state.outbox.is_some(),
    }
}

pub fn action_enabled(state: &StudyState, action: &ActionId) -> bool {
    let panels = project_panels(state);
    panels.actions_visible
        && !panels.actions_locked
        && state.scenario_state.valid_actions.contains(action)
}

pub fn visible_beliefs(state: &StudyState) -> Vec<&RobotBelief> {
    let ui = &state.ui_status;
    if !ui.video_loaded {
        return Vec::new();
    }
    state
        .scenario_state
        .robot_beliefs
        .iter()
        .filter(|belief| {
            let in_video = SHOW_IN_VIDEO_ATTRS.contains(&belief.attr.as_str());
            in_video == ui.video_playing
        })
        .collect()
}

/// Number of emphasis marks for the suggestion at 1-based `rank` out of
/// `len`; the top suggestion gets the most.
pub fn emphasis_marks(rank: usize, len: usize) -> usize {
    if rank == 0 || rank > len {
        return 0;
    }
    len - rank + 1
}

pub fn ranked_dx_suggestions(state: &StudyState) -> Vec<(&DiagnosisId, usize)> {
    let suggestions = &state.scenario_state.dx_suggestions;
    suggestions
        .iter()
        .enumerate()
        .map(|(idx, id)| (id, emphasis_marks(idx + 1, suggestions.len())))
        .collect()
}

pub fn ranked_ax_suggestions(state: &StudyState) -> Vec<(&ActionId, usize)> {
    let suggestions = &state.scenario_state.ax_suggestions;
    suggestions
        .iter()
        .enumerate()
        .map(|(idx, id)| (id, emphasis_marks(idx + 1, suggestions.len())))
        .collect()
}
