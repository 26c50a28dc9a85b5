//! Relay configuration.

use crate::dispatch::{DispatchRoute, RouteRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the dispatch bridge, the hyper transport and the
/// local actor system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Timeout used by `dispatch_default`, in milliseconds.
    pub default_timeout_ms: u64,
    /// Name of the actor that receives proxied tasks.
    pub proxy_target: String,
    /// Path used when no route rule matches.
    pub default_route: DispatchRoute,
    /// Rules mapping URLs to a delivery path.
    pub routes: Vec<RouteRule>,
    /// `User-Agent` sent by the direct transport when the request has none.
    pub user_agent: String,
    /// Mailbox capacity of each local actor.
    pub mailbox_capacity: usize,
    /// Maximum response body size in bytes.
    pub max_body_size: usize,
    /// How long stopping an actor waits for it to drain, in milliseconds.
    pub stop_grace_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 5_000,
            proxy_target: "vmproxy".to_string(),
            default_route: DispatchRoute::Direct,
            routes: Vec::new(),
            user_agent: "CLUSTER".to_string(),
            mailbox_capacity: 64,
            max_body_size: 10 * 1024 * 1024, // 10MB
            stop_grace_ms: 5_000,
        }
    }
}

impl RelayConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// Set the default dispatch timeout.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the proxy target actor name.
    pub fn proxy_target(mut self, target: impl Into<String>) -> Self {
        self.proxy_target = target.into();
        self
    }

    /// Set the fallback route.
    pub fn default_route(mut self, route: DispatchRoute) -> Self {
        self.default_route = route;
        self
    }

    /// Add a route rule.
    pub fn route(mut self, rule: RouteRule) -> Self {
        self.routes.push(rule);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the mailbox capacity.
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Set the maximum response body size.
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the actor stop grace period.
    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace_ms = grace.as_millis() as u64;
        self
    }

    /// Get the default timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}
