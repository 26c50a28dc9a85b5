//! Serializable description of a request, used at system boundaries.

use crate::error::RequestError;
use crate::http::builder::RequestBuilder;
use crate::http::request::Request;
use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flat wire form of a [`Request`].
///
/// Maps keep the order they were received in, which decides the order of
/// parameters in the rebuilt URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub params: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Rebuild the request this descriptor describes.
    pub fn to_request(&self) -> Result<Request, RequestError> {
        RequestBuilder::from_descriptor(self)?.build()
    }

    /// Parse a descriptor from JSON.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}

/// Copies a request into wire form. The query moves into `params` so that
/// rebuilding the descriptor does not duplicate it.
impl From<&Request> for RequestDescriptor {
    fn from(request: &Request) -> Self {
        let mut url = request.url().clone();
        url.set_query(None);

        Self {
            method: request.method().to_string(),
            url: url.into(),
            headers: request
                .headers()
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            params: request.params().into_iter().collect(),
            body: request.body().map(|b| b.encode()),
        }
    }
}
