//! HTTP/1 transport on top of the hyper client.

use crate::config::RelayConfig;
use crate::error::TransportFailure;
use crate::http::{Headers, Request, StatusCode};
use crate::transport::{RawResponse, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::header::{CONTENT_TYPE, USER_AGENT};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

/// Plain-HTTP transport. `https` URLs are rejected by the connector and come
/// back as a connect failure.
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    user_agent: String,
    max_body_size: usize,
}

impl HyperTransport {
    /// Create a transport from the relay configuration.
    pub fn new(config: &RelayConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            client,
            user_agent: config.user_agent.clone(),
            max_body_size: config.max_body_size,
        }
    }

    fn to_wire(&self, request: &Request) -> Result<hyper::Request<Full<Bytes>>, TransportFailure> {
        let mut builder = hyper::Request::builder()
            .method(hyper::Method::from(request.method()))
            .uri(request.url().as_str());

        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }
        if !request.headers().contains(USER_AGENT.as_str()) {
            builder = builder.header(USER_AGENT, self.user_agent.as_str());
        }
        if let Some(body) = request.body() {
            if !body.is_empty() && !request.headers().contains(CONTENT_TYPE.as_str()) {
                builder = builder.header(CONTENT_TYPE, body.content_type());
            }
        }

        builder
            .body(Full::new(request.body_bytes()))
            .map_err(|e| TransportFailure::Request(e.to_string()))
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, TransportFailure> {
        let wire = self.to_wire(request)?;

        debug!("Sending {} {}", request.method(), request.url());

        let response = self.client.request(wire).await.map_err(|e| {
            if e.is_connect() {
                TransportFailure::Connect(e.to_string())
            } else {
                TransportFailure::Io(e.to_string())
            }
        })?;

        let status = StatusCode(response.status().as_u16());
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(v) => {
                    headers.insert(name.as_str(), v);
                }
                Err(_) => warn!("Dropping non-ASCII response header '{}'", name),
            }
        }

        let body = Limited::new(response.into_body(), self.max_body_size)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    TransportFailure::BodyTooLarge {
                        limit: self.max_body_size,
                    }
                } else {
                    TransportFailure::Io(e.to_string())
                }
            })?
            .to_bytes();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
