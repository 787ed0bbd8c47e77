use chrono::Utc;
use dining_core::RuntimeAction;
use dining_core::ScenarioUpdate;

use crate::error::TransportError;

/// Outcome of one round trip, delivered back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    Completed {
        update: ScenarioUpdate,
        elapsed_ms: u64,
    },
    Failed {
        error: TransportError,
        at_ms: u64,
    },
}

impl TransitionEvent {
    pub fn into_action(self) -> RuntimeAction {
        match self {
            Self::Completed { update, .. } => RuntimeAction::UpdateState(update),
            Self::Failed { error, at_ms } => RuntimeAction::TransitionFailed {
                message: error.to_string(),
                at_ms,
            },
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch; zero for clocks set
/// before 1970.
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn failure_becomes_runtime_failure_with_readable_message() {
        let action = TransitionEvent::Failed {
            error: TransportError::Status(502),
            at_ms: 42,
        }
        .into_action();
        let RuntimeAction::TransitionFailed { message, at_ms } = action else {
            panic!("expected failure action");
        };
        assert_eq!(message, "server returned status 502");
        assert_eq!(at_ms, 42);
    }

    #[test]
    fn failure_stamps_are_wall_clock_milliseconds() {
        let before = Utc::now().timestamp_millis();
        let stamp = now_ms();
        // 2020-01-01T00:00:00Z
        assert!(stamp > 1_577_836_800_000);
        assert!(i64::try_from(stamp).expect("fits") >= before);
    }

    #[test]
    fn completion_carries_the_update_through() {
        let update = ScenarioUpdate {
            video_link: Some("https://videos.example/a.mp4".to_string()),
            ..ScenarioUpdate::default()
        };
        let action = TransitionEvent::Completed {
            update: update.clone(),
            elapsed_ms: 10,
        }
        .into_action();
        assert!(matches!(action, RuntimeAction::UpdateState(inner) if inner == update));
    }
}
