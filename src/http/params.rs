//! Query parameter encoding against a base URL.

use crate::error::RequestError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Everything except the RFC 3986 unreserved characters is escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Parse `url` as an absolute URL.
pub fn parse_url(url: &str) -> Result<Url, RequestError> {
    Url::parse(url).map_err(|e| RequestError::malformed_url(url, e))
}

/// Percent-encode a single query name or value.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT).to_string()
}

/// Append `name=value` to the query of `url`, keeping every parameter and
/// the fragment already present.
pub fn append_param(url: &str, name: &str, value: &str) -> Result<Url, RequestError> {
    let mut parsed = parse_url(url)?;
    if parsed.cannot_be_a_base() {
        return Err(RequestError::malformed_url(
            url,
            "url cannot carry a query component",
        ));
    }

    let pair = format!("{}={}", encode_component(name), encode_component(value));
    let query = match parsed.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, pair),
        _ => pair,
    };
    parsed.set_query(Some(&query));
    Ok(parsed)
}

/// Decode the query of `url` into ordered name/value pairs.
///
/// Only `%XX` escapes are decoded; a literal `+` stays a `+`, matching the
/// encoding produced by [`append_param`].
pub fn query_pairs(url: &Url) -> Vec<(String, String)> {
    let Some(query) = url.query() else {
        return Vec::new();
    };

    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_percent_encoded() {
        let url = append_param("http://x/api", "q", "a b").unwrap();
        assert_eq!(url.as_str(), "http://x/api?q=a%20b");
    }

    #[test]
    fn test_existing_params_preserved() {
        let url = append_param("http://x/api?page=2#top", "sort", "name").unwrap();
        assert_eq!(url.as_str(), "http://x/api?page=2&sort=name#top");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("page".to_string(), "2".to_string()),
                ("sort".to_string(), "name".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_value() {
        let url = append_param("http://x/api", "flag", "").unwrap();
        assert_eq!(url.as_str(), "http://x/api?flag=");
        assert_eq!(query_pairs(&url), vec![("flag".to_string(), String::new())]);
    }

    #[test]
    fn test_reserved_characters_escaped() {
        let url = append_param("http://x/", "a&b", "c=d/é").unwrap();
        assert_eq!(url.query(), Some("a%26b=c%3Dd%2F%C3%A9"));
        assert_eq!(
            query_pairs(&url),
            vec![("a&b".to_string(), "c=d/é".to_string())]
        );
    }

    #[test]
    fn test_unreserved_left_alone() {
        assert_eq!(encode_component("A-z_0.9~"), "A-z_0.9~");
    }

    #[test]
    fn test_malformed_base_url() {
        let err = append_param("not a url", "q", "1").unwrap_err();
        assert!(matches!(err, RequestError::MalformedUrl { .. }));
    }

    #[test]
    fn test_cannot_be_a_base() {
        let err = append_param("mailto:someone@example.com", "q", "1").unwrap_err();
        assert!(matches!(err, RequestError::MalformedUrl { .. }));
    }
}
