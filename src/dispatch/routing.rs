//! Route table selecting the delivery path for a request.
//!
//! Rules match on the URL host and path; the first enabled rule with the
//! highest priority decides. Requests no rule claims use the default path.

use serde::{Deserialize, Serialize};
use url::Url;

/// Delivery path of a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchRoute {
    /// Straight to the transport.
    #[default]
    Direct,
    /// Through the actor proxy.
    Proxy,
}

fn enabled_default() -> bool {
    true
}

/// A rule mapping URLs to a delivery path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Host to match, case-insensitively. `None` matches any host.
    #[serde(default)]
    pub host: Option<String>,
    /// Path pattern: exact (`/api/users`), prefix (`/api/*`) or with
    /// `:param` segments (`/api/users/:id`).
    pub path: String,
    /// Path taken by matching requests.
    pub route: DispatchRoute,
    /// Rule priority (higher = more priority).
    #[serde(default)]
    pub priority: u32,
    /// Whether the rule is enabled.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl RouteRule {
    /// Create a rule matching `path` on any host.
    pub fn new(path: impl Into<String>, route: DispatchRoute) -> Self {
        Self {
            host: None,
            path: path.into(),
            route,
            priority: 0,
            enabled: true,
        }
    }

    /// Restrict the rule to a host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the rule priority.
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the enabled state.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if this rule matches the given URL.
    pub fn matches(&self, url: &Url) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(host) = &self.host {
            match url.host_str() {
                Some(h) if h.eq_ignore_ascii_case(host) => {}
                _ => return false,
            }
        }

        let path = url.path();
        if self.path == "*" || self.path == "/*" {
            true
        } else if let Some(prefix) = self.path.strip_suffix("/*") {
            path == prefix || path.starts_with(&format!("{}/", prefix))
        } else if self.path.contains(':') {
            let route_segments: Vec<&str> = self.path.split('/').collect();
            let path_segments: Vec<&str> = path.split('/').collect();

            if route_segments.len() != path_segments.len() {
                return false;
            }

            route_segments
                .iter()
                .zip(path_segments.iter())
                .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
        } else {
            self.path == path
        }
    }
}

/// Ordered set of route rules with a fallback.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: DispatchRoute,
}

impl RouteTable {
    /// Create a table that sends everything to `fallback`.
    pub fn new(fallback: DispatchRoute) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Create a table from a list of rules.
    pub fn with_rules(fallback: DispatchRoute, rules: impl IntoIterator<Item = RouteRule>) -> Self {
        let mut table = Self::new(fallback);
        for rule in rules {
            table.add(rule);
        }
        table
    }

    /// Add a rule. Rules of equal priority keep their insertion order.
    pub fn add(&mut self, rule: RouteRule) {
        self.rules.push(rule);
        // Sort by priority (highest first)
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Find the path for a URL.
    pub fn resolve(&self, url: &Url) -> DispatchRoute {
        self.rules
            .iter()
            .find(|r| r.matches(url))
            .map(|r| r.route)
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> DispatchRoute {
        self.fallback
    }

    /// List all rules in match order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_rule_exact_match() {
        let rule = RouteRule::new("/api/users", DispatchRoute::Proxy);

        assert!(rule.matches(&url("http://x/api/users")));
        assert!(rule.matches(&url("http://x/api/users?page=2")));
        assert!(!rule.matches(&url("http://x/api/users/1")));
    }

    #[test]
    fn test_rule_wildcard_match() {
        let rule = RouteRule::new("/tasks/*", DispatchRoute::Proxy);

        assert!(rule.matches(&url("http://x/tasks")));
        assert!(rule.matches(&url("http://x/tasks/run/1")));
        assert!(!rule.matches(&url("http://x/tasksets")));
        assert!(!rule.matches(&url("http://x/other")));
    }

    #[test]
    fn test_rule_param_match() {
        let rule = RouteRule::new("/vm/:id/exec", DispatchRoute::Proxy);

        assert!(rule.matches(&url("http://x/vm/42/exec")));
        assert!(!rule.matches(&url("http://x/vm//exec")));
        assert!(!rule.matches(&url("http://x/vm/42")));
    }

    #[test]
    fn test_rule_host() {
        let rule = RouteRule::new("/*", DispatchRoute::Proxy).host("Cluster.Local");

        assert!(rule.matches(&url("http://cluster.local/anything")));
        assert!(!rule.matches(&url("http://example.com/anything")));
    }

    #[test]
    fn test_disabled_rule() {
        let rule = RouteRule::new("/*", DispatchRoute::Proxy).enabled(false);
        assert!(!rule.matches(&url("http://x/")));
    }

    #[test]
    fn test_table_priority_and_fallback() {
        let table = RouteTable::with_rules(
            DispatchRoute::Direct,
            [
                RouteRule::new("/tasks/*", DispatchRoute::Proxy),
                RouteRule::new("/tasks/health", DispatchRoute::Direct).priority(10),
            ],
        );

        assert_eq!(table.resolve(&url("http://x/tasks/run")), DispatchRoute::Proxy);
        assert_eq!(table.resolve(&url("http://x/tasks/health")), DispatchRoute::Direct);
        assert_eq!(table.resolve(&url("http://x/other")), DispatchRoute::Direct);
        assert_eq!(table.rules()[0].path, "/tasks/health");
    }

    #[test]
    fn test_rule_from_json_defaults() {
        let rule: RouteRule =
            serde_json::from_str(r#"{"path": "/tasks/*", "route": "proxy"}"#).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);
        assert_eq!(rule.host, None);
    }
}
