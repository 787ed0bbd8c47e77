use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::config::StudyConfig;

/// Seconds since the Unix epoch, fractional. This is the unit the study
/// server expects in `ui_state`.
pub type Timestamp = f64;

pub const NO_PROBLEM: &str = "none";
pub const CERTAINTY_MIN: u8 = 1;
pub const CERTAINTY_MAX: u8 = 5;
pub const CERTAINTY_DEFAULT: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosisId(pub String);

impl DiagnosisId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_no_problem(&self) -> bool {
        self.0 == NO_PROBLEM
    }
}

impl fmt::Display for DiagnosisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// The round's video has not started yet (it is still loading).
    Idle,
    VideoPlaying,
    Decision,
    DiagnosisSelected,
    CertaintyConfirmed,
    /// An action was submitted and the server has not answered yet.
    ActionSelected,
    Completed,
}

impl RoundPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Loading video",
            Self::VideoPlaying => "Watching",
            Self::Decision => "Diagnose",
            Self::DiagnosisSelected => "Rate certainty",
            Self::CertaintyConfirmed => "Choose action",
            Self::ActionSelected => "Communicating with robot",
            Self::Completed => "Complete",
        }
    }
}

/// Interaction state owned by the participant client. Reinitialized when the
/// server closes a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiStatus {
    pub video_loaded: bool,
    pub video_playing: bool,
    pub selected_dx: Vec<DiagnosisId>,
    pub confirmed_dx: Vec<DiagnosisId>,
    pub certainty_draft: u8,
    pub dx_certainty: Option<u8>,
    pub selected_action: Option<ActionId>,
    pub selected_action_idx: u64,
    pub video_loaded_time: Option<Timestamp>,
    pub video_stop_time: Option<Timestamp>,
    pub dx_selected_time: Option<Timestamp>,
    pub ax_selected_time: Option<Timestamp>,
    pub scenario_completed: bool,
    pub awaiting_response: bool,
    pub transition_error: Option<String>,
}

impl Default for UiStatus {
    fn default() -> Self {
        Self {
            video_loaded: false,
            video_playing: false,
            selected_dx: Vec::new(),
            confirmed_dx: Vec::new(),
            certainty_draft: CERTAINTY_DEFAULT,
            dx_certainty: None,
            selected_action: None,
            selected_action_idx: 0,
            video_loaded_time: None,
            video_stop_time: None,
            dx_selected_time: None,
            ax_selected_time: None,
            scenario_completed: false,
            awaiting_response: false,
            transition_error: None,
        }
    }
}

impl UiStatus {
    pub fn diagnoses_confirmed(&self) -> bool {
        !self.confirmed_dx.is_empty()
    }

    pub fn certainty_confirmed(&self) -> bool {
        self.dx_certainty.is_some()
    }

    pub fn video_finished(&self) -> bool {
        self.video_loaded && !self.video_playing
    }

    pub fn latest_stamp(&self) -> Option<Timestamp> {
        [
            self.video_loaded_time,
            self.video_stop_time,
            self.dx_selected_time,
            self.ax_selected_time,
        ]
        .into_iter()
        .flatten()
        .reduce(f64::max)
    }

    /// Never returns a time earlier than a stamp already recorded this round,
    /// so the round's timestamps stay ordered even if the caller's clock
    /// steps backwards.
    pub fn stamp(&self, at: Timestamp) -> Timestamp {
        match self.latest_stamp() {
            Some(latest) if latest > at => latest,
            _ => at,
        }
    }

    /// Fresh status for the next round; the round counter and the
    /// completion flag survive.
    pub fn next_round(&self) -> Self {
        Self {
            selected_action_idx: self.selected_action_idx,
            scenario_completed: self.scenario_completed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeliefValue {
    List(Vec<String>),
    Scalar(String),
}

impl BeliefValue {
    pub fn display(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(values) => format!("[ {} ]", values.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotBelief {
    pub attr: String,
    pub value: BeliefValue,
}

impl RobotBelief {
    pub fn scalar(attr: &str, value: &str) -> Self {
        Self {
            attr: attr.to_string(),
            value: BeliefValue::Scalar(value.to_string()),
        }
    }

    pub fn list(attr: &str, values: &[&str]) -> Self {
        Self {
            attr: attr.to_string(),
            value: BeliefValue::List(values.iter().map(|v| v.to_string()).collect()),
        }
    }
}

/// Which actions the participant may select right now. The server sends
/// either a map of `action -> bool` or a plain list of valid actions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ValidActionsWire")]
pub struct ValidActions(BTreeMap<ActionId, bool>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ValidActionsWire {
    Map(BTreeMap<ActionId, bool>),
    List(Vec<ActionId>),
}

impl From<ValidActionsWire> for ValidActions {
    fn from(wire: ValidActionsWire) -> Self {
        match wire {
            ValidActionsWire::Map(map) => Self(map),
            ValidActionsWire::List(list) => Self::from_iter(list),
        }
    }
}

impl FromIterator<ActionId> for ValidActions {
    fn from_iter<I: IntoIterator<Item = ActionId>>(iter: I) -> Self {
        Self(iter.into_iter().map(|id| (id, true)).collect())
    }
}

impl ValidActions {
    pub fn contains(&self, action: &ActionId) -> bool {
        self.0.get(action).copied().unwrap_or(false)
    }

    pub fn iter_valid(&self) -> impl Iterator<Item = &ActionId> {
        self.0
            .iter()
            .filter(|(_, valid)| **valid)
            .map(|(action, _)| action)
    }

    pub fn is_empty(&self) -> bool {
        !self.0.values().any(|valid| *valid)
    }
}

/// Snapshot pushed by the server each round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioState {
    pub video_link: String,
    pub robot_beliefs: Vec<RobotBelief>,
    pub valid_actions: ValidActions,
    pub dx_suggestions: Vec<DiagnosisId>,
    pub ax_suggestions: Vec<ActionId>,
    pub action_result: Option<bool>,
    /// Opaque to the client. Left out of serialized output while unset so
    /// the state can be written back as TOML.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub server_state_tuple: Value,
    pub scenario_completed: bool,
}

impl Default for ScenarioState {
    fn default() -> Self {
        Self {
            video_link: String::new(),
            robot_beliefs: Vec::new(),
            valid_actions: ValidActions::default(),
            dx_suggestions: Vec::new(),
            ax_suggestions: Vec::new(),
            action_result: None,
            server_state_tuple: Value::Null,
            scenario_completed: false,
        }
    }
}

/// A server response. Every field is optional; the presence of
/// `server_state_tuple` marks a complete snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioUpdate {
    pub video_link: Option<String>,
    pub robot_beliefs: Option<Vec<RobotBelief>>,
    pub valid_actions: Option<ValidActions>,
    pub dx_suggestions: Option<Vec<DiagnosisId>>,
    pub ax_suggestions: Option<Vec<ActionId>>,
    pub action_result: Option<bool>,
    pub server_state_tuple: Option<Value>,
    pub scenario_completed: Option<bool>,
}

impl ScenarioUpdate {
    pub fn is_full_snapshot(&self) -> bool {
        self.server_state_tuple
            .as_ref()
            .is_some_and(|tuple| !tuple.is_null())
    }

    pub fn completes_scenario(&self) -> bool {
        self.scenario_completed == Some(true)
    }
}

impl ScenarioState {
    pub fn replaced_by(update: ScenarioUpdate) -> Self {
        let mut next = Self::default();
        next.merge(update);
        next
    }

    pub fn merge(&mut self, update: ScenarioUpdate) {
        if let Some(video_link) = update.video_link {
            self.video_link = video_link;
        }
        if let Some(robot_beliefs) = update.robot_beliefs {
            self.robot_beliefs = robot_beliefs;
        }
        if let Some(valid_actions) = update.valid_actions {
            self.valid_actions = valid_actions;
        }
        if let Some(dx_suggestions) = update.dx_suggestions {
            self.dx_suggestions = dx_suggestions;
        }
        if let Some(ax_suggestions) = update.ax_suggestions {
            self.ax_suggestions = ax_suggestions;
        }
        if let Some(action_result) = update.action_result {
            self.action_result = Some(action_result);
        }
        if let Some(tuple) = update.server_state_tuple {
            self.server_state_tuple = tuple;
        }
        if let Some(completed) = update.scenario_completed {
            self.scenario_completed = self.scenario_completed || completed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub errors: Vec<DiagnosisId>,
    pub action: ActionId,
    pub result: bool,
}

/// Append-only log of completed rounds plus the pieces of the round that is
/// still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub dx_to_add: Option<Vec<DiagnosisId>>,
    pub ax_to_add: Option<ActionId>,
    pub result_to_add: Option<bool>,
    entries: Vec<HistoryEntry>,
}

impl HistoryState {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_staged(&self) -> bool {
        self.dx_to_add.is_some() && self.ax_to_add.is_some() && self.result_to_add.is_some()
    }

    /// Moves the staged pieces into the log. Returns false (and changes
    /// nothing) when any piece is missing.
    pub fn commit_staged(&mut self) -> bool {
        if !self.is_staged() {
            return false;
        }
        let (Some(errors), Some(action), Some(result)) = (
            self.dx_to_add.take(),
            self.ax_to_add.take(),
            self.result_to_add.take(),
        ) else {
            return false;
        };
        self.entries.push(HistoryEntry {
            errors,
            action,
            result,
        });
        true
    }

    /// Drops the staged pieces of a round the server answered without an
    /// outcome; that round can no longer be recorded.
    pub fn discard_previous_round(&mut self) -> Option<ActionId> {
        let action = self.ax_to_add.take()?;
        self.dx_to_add = None;
        self.result_to_add = None;
        Some(action)
    }

    /// 1-based positions, most recent round first.
    pub fn display_rows(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, entry)| (idx + 1, entry))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Participant,
    Reducer,
    Orchestrator,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Reducer => "reducer",
            Self::Orchestrator => "orchestrator",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<u64>,
    pub source: LogSource,
    pub round: u64,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, round: u64, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            ts_ms: None,
            source,
            round,
            message: message.into(),
        }
    }

    pub fn at_ms(mut self, ts_ms: u64) -> Self {
        self.ts_ms = Some(ts_ms);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(500)
    }
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            next_seq: 1,
            buf: VecDeque::with_capacity(cap.max(1)),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Body of the request sent to the study server when an action is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub server_state_tuple: Value,
    pub action: ActionId,
    pub ui_state: UiStatus,
}

#[derive(Debug, Clone)]
pub struct StudyState {
    pub config: Arc<StudyConfig>,
    pub ui_status: UiStatus,
    pub scenario_state: ScenarioState,
    pub history: HistoryState,
    pub logs: LogBuffer,
    /// The most recent request handed to the orchestrator, kept until the
    /// server answers so a failed round trip can be resent unchanged.
    pub outbox: Option<TransitionRequest>,
}

impl StudyState {
    pub fn new(config: StudyConfig) -> Self {
        let scenario_state = config.initial_state.clone();
        Self {
            config: Arc::new(config),
            ui_status: UiStatus::default(),
            scenario_state,
            history: HistoryState::default(),
            logs: LogBuffer::default(),
            outbox: None,
        }
    }

    pub fn round(&self) -> u64 {
        self.ui_status.selected_action_idx
    }

    pub fn phase(&self) -> RoundPhase {
        let ui = &self.ui_status;
        if ui.awaiting_response {
            RoundPhase::ActionSelected
        } else if ui.scenario_completed && ui.video_finished() {
            RoundPhase::Completed
        } else if !ui.video_loaded {
            RoundPhase::Idle
        } else if ui.video_playing {
            RoundPhase::VideoPlaying
        } else if !ui.diagnoses_confirmed() {
            RoundPhase::Decision
        } else if !ui.certainty_confirmed() {
            RoundPhase::DiagnosisSelected
        } else {
            RoundPhase::CertaintyConfirmed
        }
    }
}
