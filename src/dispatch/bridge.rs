//! Bounded-wait dispatch of a request over the direct or proxy path.

use crate::config::RelayConfig;
use crate::dispatch::routing::{DispatchRoute, RouteTable};
use crate::error::RequestError;
use crate::http::{Headers, Outcome, Payload, Request, Response};
use crate::proxy::{ActorSystem, ProxyTarget, TaskMessage, TaskReply};
use crate::transport::{RawResponse, Transport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Sends a request down exactly one path and waits at most a given timeout
/// for the answer.
///
/// Every call ends in exactly one [`Response`]; the only `Err` is a
/// [`RequestError`] raised while validating the request, before any I/O.
/// Outcomes are never retried. The bridge keeps no per-call state, so one
/// instance can serve concurrent dispatches.
pub struct DispatchBridge {
    transport: Arc<dyn Transport>,
    actors: Arc<dyn ActorSystem>,
    target: ProxyTarget,
    routes: RouteTable,
    default_timeout: Duration,
    id_prefix: String,
    next_id: AtomicU64,
}

impl DispatchBridge {
    /// Create a bridge over the given transport and actor system.
    pub fn new(
        transport: Arc<dyn Transport>,
        actors: Arc<dyn ActorSystem>,
        config: &RelayConfig,
    ) -> Self {
        Self {
            transport,
            actors,
            target: ProxyTarget::new(config.proxy_target.clone()),
            routes: RouteTable::with_rules(config.default_route, config.routes.iter().cloned()),
            default_timeout: config.timeout(),
            id_prefix: id_prefix(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Name of the actor that receives proxied requests.
    pub fn proxy_target(&self) -> &ProxyTarget {
        &self.target
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Path the route table picks for `request`.
    pub fn route_for(&self, request: &Request) -> DispatchRoute {
        self.routes.resolve(request.url())
    }

    /// Dispatch with the configured default timeout.
    pub async fn dispatch_default(&self, request: Request) -> Result<Response, RequestError> {
        self.dispatch(request, self.default_timeout).await
    }

    /// Dispatch over the path chosen by the route table.
    pub async fn dispatch(
        &self,
        request: Request,
        timeout: Duration,
    ) -> Result<Response, RequestError> {
        let route = self.route_for(&request);
        self.dispatch_via(route, request, timeout).await
    }

    /// Dispatch over an explicit path.
    pub async fn dispatch_via(
        &self,
        route: DispatchRoute,
        request: Request,
        timeout: Duration,
    ) -> Result<Response, RequestError> {
        request.validate()?;

        let request_id = self.next_request_id();
        debug!(
            "Dispatching {} {} via {:?} (timeout {:?}) [{}]",
            request.method(),
            request.url(),
            route,
            timeout,
            request_id
        );

        let started = Instant::now();
        let response = match route {
            DispatchRoute::Direct => self.send_direct(&request, timeout).await,
            DispatchRoute::Proxy => self.send_proxy(&request_id, request, timeout).await,
        }
        .with_elapsed(started.elapsed());

        match response.outcome {
            Outcome::Success => info!(
                "Dispatch [{}] completed in {:?}",
                request_id, response.elapsed
            ),
            outcome => warn!(
                "Dispatch [{}] ended with {:?} after {:?}: {}",
                request_id,
                outcome,
                response.elapsed,
                response.detail.as_deref().unwrap_or("")
            ),
        }

        Ok(response)
    }

    /// Ids are unique per bridge; the prefix separates bridges and runs.
    fn next_request_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.id_prefix, n)
    }

    async fn send_direct(&self, request: &Request, timeout: Duration) -> Response {
        match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Err(_) => Response::timeout(timeout),
            Ok(Err(failure)) => Response::transport_error(failure.to_string()),
            Ok(Ok(raw)) => translate_raw(raw),
        }
    }

    async fn send_proxy(&self, request_id: &str, request: Request, timeout: Duration) -> Response {
        let message = TaskMessage::new(request_id, request);
        let exchange = async {
            match self.actors.ask(&self.target, message, timeout).await {
                Ok(pending) => pending.await,
                Err(refused) => Err(refused),
            }
        };

        // Dropping `exchange` on timeout drops the reply receiver, so a late
        // answer from the actor is discarded.
        match tokio::time::timeout(timeout, exchange).await {
            Err(_) => Response::timeout(timeout),
            Ok(Err(delivery)) => Response::transport_error(delivery.to_string()),
            Ok(Ok(reply)) => translate_reply(reply),
        }
    }
}

/// Turn a raw response into a [`Response`]. A body announced as JSON that
/// does not parse is a protocol error.
fn translate_raw(raw: RawResponse) -> Response {
    let json = raw.is_json();
    let RawResponse {
        status,
        headers,
        body,
    } = raw;

    let payload = if body.is_empty() {
        Payload::Empty
    } else if json {
        match serde_json::from_slice(&body) {
            Ok(document) => Payload::Document(document),
            Err(e) => {
                return Response::protocol_error(format!("response body is not valid JSON: {}", e))
                    .with_status(status)
                    .with_headers(headers);
            }
        }
    } else if is_text(&headers) {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Payload::Text(text),
            Err(_) => Payload::Bytes(body),
        }
    } else {
        Payload::Bytes(body)
    };

    Response::success(payload)
        .with_status(status)
        .with_headers(headers)
}

fn translate_reply(reply: TaskReply) -> Response {
    match reply {
        TaskReply::Response(raw) => translate_raw(raw),
        TaskReply::Text(text) => Response::success(Payload::Text(text)),
        TaskReply::Document(document) => Response::success(Payload::Document(document)),
        TaskReply::Opaque { type_name } => {
            Response::protocol_error(format!("unrecognised reply of type '{}'", type_name))
        }
    }
}

fn is_text(headers: &Headers) -> bool {
    headers
        .get("content-type")
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|media| media.trim().to_ascii_lowercase().starts_with("text/"))
}

/// Construction time of a bridge, used as its request id prefix.
fn id_prefix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
