use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use dining_core::EndpointConfig;
use dining_core::ScenarioUpdate;
use dining_core::TransitionRequest;
use serde_json::json;

use crate::error::TransportError;

/// Carries a transition request to the study server and brings back the
/// next scenario state.
pub trait StateTransport: Send + Sync {
    fn next_state(&self, request: &TransitionRequest) -> Result<ScenarioUpdate, TransportError>;

    fn label(&self) -> &str;
}

pub struct HttpTransport {
    agent: ureq::Agent,
    url: String,
}

impl HttpTransport {
    pub fn new(endpoint: &EndpointConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(endpoint.timeout_secs.max(1))))
            .build()
            .into();
        Self {
            agent,
            url: endpoint.next_state_url.clone(),
        }
    }
}

impl StateTransport for HttpTransport {
    fn next_state(&self, request: &TransitionRequest) -> Result<ScenarioUpdate, TransportError> {
        let response = self
            .agent
            .post(&self.url)
            .header("Accept", "application/json")
            .send_json(request)?;
        response
            .into_body()
            .read_json::<ScenarioUpdate>()
            .map_err(|err| TransportError::Decode(err.to_string()))
    }

    fn label(&self) -> &str {
        "http"
    }
}

/// Plays back a fixed list of server responses in order. Used for offline
/// sessions and tests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ScenarioUpdate, TransportError>>>,
    received: Mutex<Vec<TransitionRequest>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<ScenarioUpdate, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// A short three-round walk around the dining room that ends the
    /// scenario on the third answer.
    pub fn demo() -> Self {
        let rounds = [
            json!({
                "server_state_tuple": "dt.dt.gripper.default.gripper",
                "video_link": "demo://look_at_dt.mp4",
                "robot_beliefs": [
                    {"attr": "Location", "value": "Dining Table"},
                    {"attr": "Object in gripper", "value": "Empty"},
                    {"attr": "Objects in view", "value": ["Jug", "Bowl", "Mug"]},
                    {"attr": "Arm status", "value": "Not moving"},
                ],
                "valid_actions": ["at_c", "at_kc", "go_to_c", "go_to_kc", "pick_mug", "pick_bowl", "pick_jug"],
                "dx_suggestions": ["none"],
                "ax_suggestions": ["pick_mug", "go_to_kc"],
                "action_result": true,
            }),
            json!({
                "server_state_tuple": "dt.dt.mug.default.gripper",
                "video_link": "demo://pick_mug.mp4",
                "robot_beliefs": [
                    {"attr": "Location", "value": "Dining Table"},
                    {"attr": "Object in gripper", "value": "Mug"},
                    {"attr": "Objects in view", "value": ["Jug", "Bowl"]},
                    {"attr": "Arm status", "value": "In motion"},
                ],
                "valid_actions": ["go_to_c", "go_to_kc", "place"],
                "dx_suggestions": ["none"],
                "ax_suggestions": ["go_to_c"],
                "action_result": true,
            }),
            json!({
                "server_state_tuple": "c.c.mug.default.gripper",
                "video_link": "demo://go_to_c.mp4",
                "robot_beliefs": [
                    {"attr": "Location", "value": "Couch"},
                    {"attr": "Object in gripper", "value": "Mug"},
                    {"attr": "Objects in view", "value": []},
                    {"attr": "Arm status", "value": "Not moving"},
                ],
                "valid_actions": ["place"],
                "dx_suggestions": ["none"],
                "ax_suggestions": ["place"],
                "action_result": true,
                "scenario_completed": true,
            }),
        ];
        Self::new(rounds.into_iter().map(|round| {
            serde_json::from_value::<ScenarioUpdate>(round)
                .map_err(|err| TransportError::Decode(err.to_string()))
        }))
    }

    pub fn push(&self, response: Result<ScenarioUpdate, TransportError>) {
        locked(&self.responses).push_back(response);
    }

    pub fn received(&self) -> Vec<TransitionRequest> {
        locked(&self.received).clone()
    }

    pub fn remaining(&self) -> usize {
        locked(&self.responses).len()
    }
}

impl StateTransport for ScriptedTransport {
    fn next_state(&self, request: &TransitionRequest) -> Result<ScenarioUpdate, TransportError> {
        locked(&self.received).push(request.clone());
        locked(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }

    fn label(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    use dining_core::ActionId;
    use dining_core::UiStatus;
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(action: &str) -> TransitionRequest {
        TransitionRequest {
            server_state_tuple: json!("dt.kc.gripper.default.gripper"),
            action: ActionId::new(action),
            ui_state: UiStatus::default(),
        }
    }

    /// Serves a single canned HTTP response and hands back the raw request
    /// text it received.
    fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}/next_state/", listener.local_addr().expect("addr"));
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut raw = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = stream.read(&mut buf).expect("read");
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&raw).into_owned()
        });
        (url, handle)
    }

    fn endpoint(url: String) -> EndpointConfig {
        EndpointConfig {
            next_state_url: url,
            timeout_secs: 5,
            ..EndpointConfig::default()
        }
    }

    #[test]
    fn http_transport_posts_request_and_decodes_snapshot() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"server_state_tuple":"kc.kc.gripper.default.gripper","valid_actions":{"pick_mug":true},"action_result":false}"#,
        );
        let transport = HttpTransport::new(&endpoint(url));

        let update = transport.next_state(&request("go_to_kc")).expect("update");
        assert!(update.is_full_snapshot());
        assert_eq!(update.action_result, Some(false));

        let raw = server.join().expect("server");
        assert!(raw.starts_with("POST /next_state/"));
        let body = &raw[raw.find("\r\n\r\n").expect("body") + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).expect("json body");
        assert_eq!(sent["action"], json!("go_to_kc"));
        assert_eq!(sent["server_state_tuple"], json!("dt.kc.gripper.default.gripper"));
    }

    #[test]
    fn http_transport_reports_server_errors_by_status() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");
        let transport = HttpTransport::new(&endpoint(url));

        let err = transport.next_state(&request("place")).expect_err("status");
        assert_eq!(err, TransportError::Status(500));
        server.join().expect("server");
    }

    #[test]
    fn scripted_transport_answers_in_order_and_records_requests() {
        let transport = ScriptedTransport::demo();
        assert_eq!(transport.remaining(), 3);

        let first = transport.next_state(&request("look_at_dt")).expect("first");
        assert_eq!(first.server_state_tuple, Some(json!("dt.dt.gripper.default.gripper")));
        transport.next_state(&request("pick_mug")).expect("second");
        let last = transport.next_state(&request("go_to_c")).expect("third");
        assert!(last.completes_scenario());

        let err = transport.next_state(&request("place")).expect_err("exhausted");
        assert_eq!(err, TransportError::Network("script exhausted".to_string()));

        let actions: Vec<String> = transport
            .received()
            .into_iter()
            .map(|sent| sent.action.to_string())
            .collect();
        assert_eq!(actions, vec!["look_at_dt", "pick_mug", "go_to_c", "place"]);
    }
}
