//! Ordered, case-insensitive header map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Request and response headers.
///
/// Names are stored lower-case and looked up case-insensitively. Inserting a
/// name that is already present replaces its value in place, so a header
/// appears at most once. Plain HTTP allows repeated fields; callers that need
/// that must join the values themselves before inserting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct Headers {
    entries: IndexMap<String, String>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, returning the value it replaced.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Get a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    /// Check whether a header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a header, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name.to_ascii_lowercase().as_str())
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<IndexMap<String, String>> for Headers {
    fn from(map: IndexMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Headers> for IndexMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers.entries
    }
}

/// Returns `true` if `name` is a valid HTTP field name (RFC 9110 token).
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

/// Returns `true` if `value` can be sent as a header value.
pub(crate) fn is_valid_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("accept", "application/json");
        let previous = headers.insert("Accept", "text/plain");

        assert_eq!(previous.as_deref(), Some("application/json"));
        assert_eq!(headers.get("ACCEPT"), Some("text/plain"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_insertion_order_kept() {
        let headers: Headers = [("X-B", "2"), ("X-A", "1"), ("x-b", "3")]
            .into_iter()
            .collect();

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x-b", "x-a"]);
        assert_eq!(headers.get("x-b"), Some("3"));
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        assert_eq!(headers.remove("content-type").as_deref(), Some("text/plain"));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("content-type"), None);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut headers: Headers = [("A", "1"), ("B", "2"), ("C", "3")].into_iter().collect();
        headers.remove("b");

        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_serde_lowercases_names() {
        let headers: Headers = serde_json::from_str(r#"{"X-Trace": "t1", "x-trace": "t2"}"#).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-TRACE"), Some("t2"));
        assert_eq!(serde_json::to_string(&headers).unwrap(), r#"{"x-trace":"t2"}"#);
    }

    #[test]
    fn test_name_and_value_validation() {
        assert!(is_valid_name("X-Request-Id"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("bad name"));
        assert!(!is_valid_name("bad:name"));
        assert!(is_valid_value("plain value"));
        assert!(!is_valid_value("split\r\nInjected: yes"));
    }
}
