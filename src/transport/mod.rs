//! Direct delivery path.
//!
//! A [`Transport`] takes a built request to its destination and returns what
//! came back. Connection management, TLS and redirects live behind the trait;
//! the dispatch bridge only needs `execute`.

mod hyper_transport;

pub use hyper_transport::HyperTransport;

use crate::error::TransportFailure;
use crate::http::{Headers, Request, StatusCode};
use async_trait::async_trait;
use bytes::Bytes;

/// Undecoded response as it came off the wire (or out of a worker).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }

    /// A 200 response with a JSON body.
    pub fn json<T: serde::Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        Ok(Self::new(StatusCode::OK)
            .header("content-type", "application/json")
            .body(body))
    }

    /// A 200 response with a text body.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .header("content-type", "text/plain; charset=utf-8")
            .body(content.into())
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether the content type announces a JSON body.
    pub fn is_json(&self) -> bool {
        self.headers.get("content-type").is_some_and(|ct| {
            let media = ct.split(';').next().unwrap_or("").trim();
            media.eq_ignore_ascii_case("application/json") || media.ends_with("+json")
        })
    }
}

/// Sends a request directly to its destination.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request and return the raw response.
    async fn execute(&self, request: &Request) -> Result<RawResponse, TransportFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        assert!(RawResponse::new(StatusCode(200))
            .header("Content-Type", "application/json; charset=utf-8")
            .is_json());
        assert!(RawResponse::new(StatusCode(200))
            .header("content-type", "application/problem+json")
            .is_json());
        assert!(!RawResponse::text("hi").is_json());
        assert!(!RawResponse::new(StatusCode(204)).is_json());
    }

    #[test]
    fn test_json_constructor() {
        let raw = RawResponse::json(&serde_json::json!({"ok": true})).unwrap();
        assert_eq!(raw.status, StatusCode::OK);
        assert!(raw.is_json());
        assert_eq!(raw.body.as_ref(), br#"{"ok":true}"#);
    }
}
