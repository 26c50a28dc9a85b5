//! Request bodies.

use bytes::Bytes;
use serde_json::Value;

/// A request body: raw bytes, UTF-8 text, or a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bytes(Bytes),
    Text(String),
    Document(Value),
}

impl Body {
    /// An empty byte body.
    pub fn empty() -> Self {
        Body::Bytes(Bytes::new())
    }

    /// Encode the body to bytes.
    ///
    /// Encoding never fails, and encoding the same body twice yields the same
    /// bytes. Documents serialize compactly in their map order.
    pub fn encode(&self) -> Bytes {
        match self {
            Body::Bytes(bytes) => bytes.clone(),
            Body::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            Body::Document(document) => Bytes::from(document.to_string()),
        }
    }

    /// Media type describing the encoded bytes.
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Bytes(_) => "application/octet-stream",
            Body::Text(_) => "text/plain; charset=utf-8",
            Body::Document(_) => "application/json",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Bytes(bytes) => bytes.is_empty(),
            Body::Text(text) => text.is_empty(),
            Body::Document(_) => false,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(document: Value) -> Self {
        Body::Document(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_is_deterministic() {
        let body = Body::from(json!({"b": [1, 2, {"c": null}], "a": "x"}));
        assert_eq!(body.encode(), body.encode());
        assert_eq!(body.clone().encode(), body.encode());
    }

    #[test]
    fn test_text_is_utf8() {
        let body = Body::from("héllo");
        assert_eq!(body.encode().as_ref(), "héllo".as_bytes());
        assert_eq!(body.content_type(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_bytes_pass_through() {
        let body = Body::from(vec![0u8, 159, 146, 150]);
        assert_eq!(body.encode().as_ref(), &[0u8, 159, 146, 150]);
    }

    #[test]
    fn test_document_encoding() {
        let body = Body::from(json!({"key": "value"}));
        assert_eq!(body.encode().as_ref(), br#"{"key":"value"}"#);
        assert_eq!(body.content_type(), "application/json");
    }

    #[test]
    fn test_empty() {
        assert!(Body::empty().is_empty());
        assert!(Body::from("").is_empty());
        assert!(!Body::from(json!({})).is_empty());
    }
}
