//! Dispatch results.

use crate::http::headers::Headers;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Status code of a reply. Transport replies carry the HTTP status; proxy
/// replies that are not raw responses have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    fn class(&self) -> u16 {
        self.0 / 100
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.class() == 2
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        self.class() == 4
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        self.class() == 5
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A reply arrived in time and was understood.
    Success,
    /// No reply arrived within the timeout. The worker may still be busy.
    Timeout,
    /// The channel refused the task or broke before a reply arrived.
    TransportError,
    /// A reply arrived but could not be interpreted.
    ProtocolError,
}

/// Response payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    #[default]
    Empty,
    Bytes(Bytes),
    Text(String),
    Document(Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Get the payload as text, decoding bytes lossily.
    pub fn text(&self) -> Option<String> {
        match self {
            Payload::Empty => None,
            Payload::Bytes(b) => Some(String::from_utf8_lossy(b).to_string()),
            Payload::Text(t) => Some(t.clone()),
            Payload::Document(d) => Some(d.to_string()),
        }
    }

    /// Deserialize a document payload.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        match self {
            Payload::Document(d) => Some(serde_json::from_value(d.clone())),
            Payload::Bytes(b) => Some(serde_json::from_slice(b)),
            Payload::Text(t) => Some(serde_json::from_str(t)),
            Payload::Empty => None,
        }
    }
}

/// The single result of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub outcome: Outcome,
    /// Status reported by the remote side, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusCode>,
    pub headers: Headers,
    pub payload: Payload,
    /// Human readable reason for a non-success outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Time spent between sending and the terminal state.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl Response {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            status: None,
            headers: Headers::new(),
            payload: Payload::Empty,
            detail: None,
            elapsed: Duration::ZERO,
        }
    }

    /// A successful response carrying `payload`.
    pub fn success(payload: Payload) -> Self {
        Self {
            payload,
            ..Self::new(Outcome::Success)
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            detail: Some(format!("no reply within {}ms", after.as_millis())),
            ..Self::new(Outcome::Timeout)
        }
    }

    pub fn transport_error(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(Outcome::TransportError)
        }
    }

    pub fn protocol_error(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(Outcome::ProtocolError)
        }
    }

    pub fn with_status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub(crate) fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
