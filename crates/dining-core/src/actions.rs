use super::state::ActionId;
use super::state::DiagnosisId;
use super::state::LogEntry;
use super::state::ScenarioUpdate;
use super::state::Timestamp;

#[derive(Debug, Clone)]
pub enum StudyAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

/// Intents raised by the participant (or by the video player on their
/// behalf). Timestamps come from the dispatcher.
#[derive(Debug, Clone)]
pub enum UserAction {
    PlayVideo {
        at: Timestamp,
    },
    DisplayState {
        at: Timestamp,
    },
    ToggleDiagnosis(DiagnosisId),
    ConfirmDiagnoses {
        diagnoses: Vec<DiagnosisId>,
        at: Timestamp,
    },
    AdjustCertainty(i8),
    ConfirmCertainty {
        certainty: u8,
    },
    SelectAction {
        action: ActionId,
        at: Timestamp,
    },
    RetryTransition,
    CompleteScenario,
}

impl UserAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlayVideo { .. } => "play-video",
            Self::DisplayState { .. } => "display-state",
            Self::ToggleDiagnosis(_) => "toggle-diagnosis",
            Self::ConfirmDiagnoses { .. } => "confirm-diagnoses",
            Self::AdjustCertainty(_) => "adjust-certainty",
            Self::ConfirmCertainty { .. } => "confirm-certainty",
            Self::SelectAction { .. } => "select-action",
            Self::RetryTransition => "retry-transition",
            Self::CompleteScenario => "complete-scenario",
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    UpdateState(ScenarioUpdate),
    TransitionFailed { message: String, at_ms: u64 },
    AppendStructuredLog(LogEntry),
    ClearLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: &'static str,
    pub label: &'static str,
}

/// Diagnoses in the order they are laid out in the diagnosis panel.
pub const DEFAULT_DIAGNOSIS_ORDER: [CatalogItem; 11] = [
    CatalogItem {
        id: "lost",
        label: "The robot is lost",
    },
    CatalogItem {
        id: "cannot_move",
        label: "The robot is stuck and cannot move to a location",
    },
    CatalogItem {
        id: "base_collision",
        label: "The robot has collided with an object",
    },
    CatalogItem {
        id: "path_blocked",
        label: "The robot's path is blocked",
    },
    CatalogItem {
        id: "cannot_pick",
        label: "The cup cannot be picked up",
    },
    CatalogItem {
        id: "cannot_see",
        label: "The cup is not visible",
    },
    CatalogItem {
        id: "different_location",
        label: "The cup is not where it should be",
    },
    CatalogItem {
        id: "object_fell",
        label: "The object fell out of the robot's hand",
    },
    CatalogItem {
        id: "battery_low",
        label: "The battery is low",
    },
    CatalogItem {
        id: "video_problem",
        label: "There is a problem with the camera",
    },
    CatalogItem {
        id: "none",
        label: "There is no problem",
    },
];

/// Actions in the order they are laid out in the action panel.
pub const DEFAULT_ACTION_ORDER: [CatalogItem; 17] = [
    CatalogItem {
        id: "at_c",
        label: "Update robot's location belief to: Couch",
    },
    CatalogItem {
        id: "at_dt",
        label: "Update robot's location belief to: Dining Table",
    },
    CatalogItem {
        id: "at_kc",
        label: "Update robot's location belief to: Kitchen Counter",
    },
    CatalogItem {
        id: "go_to_c",
        label: "Navigate to Couch",
    },
    CatalogItem {
        id: "go_to_dt",
        label: "Navigate to Dining Table",
    },
    CatalogItem {
        id: "go_to_kc",
        label: "Navigate to Kitchen Counter",
    },
    CatalogItem {
        id: "remove_obstacle",
        label: "Remove the obstacle blocking navigation",
    },
    CatalogItem {
        id: "out_of_collision",
        label: "Move away from a collision",
    },
    CatalogItem {
        id: "look_at_c",
        label: "Look at Couch",
    },
    CatalogItem {
        id: "look_at_dt",
        label: "Look at Dining Table",
    },
    CatalogItem {
        id: "look_at_kc",
        label: "Look at Kitchen Counter",
    },
    CatalogItem {
        id: "pick_bowl",
        label: "Pick up the Bowl",
    },
    CatalogItem {
        id: "pick_jug",
        label: "Pick up the Jug",
    },
    CatalogItem {
        id: "pick_mug",
        label: "Pick up the Cup",
    },
    CatalogItem {
        id: "place",
        label: "Put away held object",
    },
    CatalogItem {
        id: "restart_video",
        label: "Restart the camera",
    },
    CatalogItem {
        id: "find_charger",
        label: "Find the charger and navigate to it",
    },
];

/// Adds or removes `diagnosis` from an in-progress selection, keeping
/// catalog order. "No problem" excludes every other diagnosis.
pub fn toggle_diagnosis(
    selection: &[DiagnosisId],
    diagnosis: &DiagnosisId,
    order: &[DiagnosisId],
) -> Vec<DiagnosisId> {
    if selection.contains(diagnosis) {
        return selection
            .iter()
            .filter(|selected| *selected != diagnosis)
            .cloned()
            .collect();
    }

    let mut next: Vec<DiagnosisId> = if diagnosis.is_no_problem() {
        Vec::new()
    } else {
        selection
            .iter()
            .filter(|selected| !selected.is_no_problem())
            .cloned()
            .collect()
    };
    next.push(diagnosis.clone());
    next.sort_by_key(|selected| {
        order
            .iter()
            .position(|candidate| candidate == selected)
            .unwrap_or(usize::MAX)
    });
    next
}
