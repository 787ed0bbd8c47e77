#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("server returned status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode server response: {0}")]
    Decode(String),
    #[error("a request is already in flight")]
    Busy,
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status(code),
            ureq::Error::Timeout(_) => Self::Timeout,
            ureq::Error::Json(err) => Self::Decode(err.to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}
