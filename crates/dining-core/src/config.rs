use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use super::actions::CatalogItem;
use super::actions::DEFAULT_ACTION_ORDER;
use super::actions::DEFAULT_DIAGNOSIS_ORDER;
use super::state::ActionId;
use super::state::DiagnosisId;
use super::state::RobotBelief;
use super::state::ScenarioState;
use super::state::ValidActions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the participant client is told from outside: where the
/// server lives, which experiment condition applies, the catalogs and the
/// state to start from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StudyConfig {
    pub endpoint: EndpointConfig,
    pub condition: ConditionFlags,
    pub goal: GoalConfig,
    pub playback: PlaybackConfig,
    pub catalog: CatalogConfig,
    pub initial_state: ScenarioState,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            condition: ConditionFlags::default(),
            goal: GoalConfig::default(),
            playback: PlaybackConfig::default(),
            catalog: CatalogConfig::default(),
            initial_state: default_initial_state(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub next_state_url: String,
    pub completion_url: Option<String>,
    pub timeout_secs: u64,
    /// Pause before a request is sent, so the "communicating" mask is
    /// visible for at least this long.
    pub submit_delay_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            next_state_url: "http://localhost:8000/dining_room/study/next_state/".to_string(),
            completion_url: None,
            timeout_secs: 30,
            submit_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ConditionFlags {
    pub show_dx_suggestions: bool,
    pub show_ax_suggestions: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GoalConfig {
    pub object: String,
    pub source: String,
    pub destination: String,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            object: "Mug".to_string(),
            source: "Kitchen Counter".to_string(),
            destination: "Couch".to_string(),
        }
    }
}

impl GoalConfig {
    pub fn sentence(&self) -> String {
        format!(
            "The robot's goal is to pick the {} from the {} and take it to the {}.",
            self.object, self.source, self.destination
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PlaybackConfig {
    pub video_duration_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            video_duration_ms: 6_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
}

impl From<&CatalogItem> for CatalogEntry {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.to_string(),
            label: item.label.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub diagnoses: Vec<CatalogEntry>,
    pub actions: Vec<CatalogEntry>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            diagnoses: DEFAULT_DIAGNOSIS_ORDER.iter().map(CatalogEntry::from).collect(),
            actions: DEFAULT_ACTION_ORDER.iter().map(CatalogEntry::from).collect(),
        }
    }
}

impl CatalogConfig {
    pub fn diagnosis_order(&self) -> Vec<DiagnosisId> {
        self.diagnoses
            .iter()
            .map(|entry| DiagnosisId::new(entry.id.as_str()))
            .collect()
    }

    pub fn has_diagnosis(&self, id: &DiagnosisId) -> bool {
        self.diagnoses.iter().any(|entry| entry.id == id.as_str())
    }

    /// Falls back to the raw id when the catalog has no label for it.
    pub fn diagnosis_label<'a>(&'a self, id: &'a DiagnosisId) -> &'a str {
        self.diagnoses
            .iter()
            .find(|entry| entry.id == id.as_str())
            .map_or(id.as_str(), |entry| entry.label.as_str())
    }

    pub fn action_label<'a>(&'a self, id: &'a ActionId) -> &'a str {
        self.actions
            .iter()
            .find(|entry| entry.id == id.as_str())
            .map_or(id.as_str(), |entry| entry.label.as_str())
    }
}

fn default_initial_state() -> ScenarioState {
    ScenarioState {
        video_link:
            "https://dl.dropboxusercontent.com/s/qxro9nj1zbf6mmf/dt.kc.gripper.default.gripper.noop.mp4"
                .to_string(),
        robot_beliefs: vec![
            RobotBelief::scalar("Location", "Dining Table"),
            RobotBelief::scalar("Object in gripper", "Empty"),
            RobotBelief::list("Objects in view", &["Jug", "Bowl"]),
            RobotBelief::scalar("Arm status", "In motion"),
        ],
        valid_actions: [
            "at_c",
            "at_dt",
            "go_to_c",
            "go_to_dt",
            "look_at_c",
            "look_at_dt",
            "pick_bowl",
            "pick_mug",
            "place",
        ]
        .into_iter()
        .map(ActionId::new)
        .collect::<ValidActions>(),
        dx_suggestions: vec![DiagnosisId::new("cannot_see")],
        ax_suggestions: ["look_at_dt", "go_to_c", "place"]
            .into_iter()
            .map(ActionId::new)
            .collect(),
        action_result: Some(true),
        server_state_tuple: json!("dt.kc.gripper.default.gripper"),
        scenario_completed: false,
    }
}

impl StudyConfig {
    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.next_state_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "endpoint.next_state_url must not be empty".to_string(),
            ));
        }
        if self.catalog.diagnoses.is_empty() || self.catalog.actions.is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.diagnoses and catalog.actions must not be empty".to_string(),
            ));
        }
        for (kind, entries) in [
            ("diagnosis", &self.catalog.diagnoses),
            ("action", &self.catalog.actions),
        ] {
            for (idx, entry) in entries.iter().enumerate() {
                if entries[..idx].iter().any(|prior| prior.id == entry.id) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate {kind} id in catalog: {}",
                        entry.id
                    )));
                }
            }
        }
        Ok(())
    }
}
