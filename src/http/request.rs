//! Request method and the immutable request value.

use crate::error::RequestError;
use crate::http::body::Body;
use crate::http::headers::{self, Headers};
use crate::http::params;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Head => "HEAD",
            RequestMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method names are matched case-sensitively against the upper-case names.
impl FromStr for RequestMethod {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            "PATCH" => Ok(RequestMethod::Patch),
            "HEAD" => Ok(RequestMethod::Head),
            "OPTIONS" => Ok(RequestMethod::Options),
            other => Err(RequestError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl From<RequestMethod> for hyper::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => hyper::Method::GET,
            RequestMethod::Post => hyper::Method::POST,
            RequestMethod::Put => hyper::Method::PUT,
            RequestMethod::Delete => hyper::Method::DELETE,
            RequestMethod::Patch => hyper::Method::PATCH,
            RequestMethod::Head => hyper::Method::HEAD,
            RequestMethod::Options => hyper::Method::OPTIONS,
        }
    }
}

/// A built request.
///
/// Produced by [`crate::http::RequestBuilder::build`]. All fields are owned
/// snapshots and there are no mutators.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: RequestMethod,
    url: Url,
    headers: Headers,
    body: Option<Body>,
}

impl Request {
    pub(crate) fn new(
        method: RequestMethod,
        url: Url,
        headers: Headers,
        body: Option<Body>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Query parameters of the URL, decoded, in order.
    pub fn params(&self) -> Vec<(String, String)> {
        params::query_pairs(&self.url)
    }

    /// Get the first value of a query parameter.
    pub fn param(&self, name: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Encoded body bytes, empty when no body is set.
    pub fn body_bytes(&self) -> bytes::Bytes {
        self.body.as_ref().map(Body::encode).unwrap_or_default()
    }

    /// Check that the request can be dispatched.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(RequestError::invalid(format!(
                "unsupported url scheme '{}'",
                self.url.scheme()
            )));
        }

        if self.url.host_str().map_or(true, str::is_empty) {
            return Err(RequestError::invalid("url has no host"));
        }

        for (name, value) in self.headers.iter() {
            if !headers::is_valid_name(name) {
                return Err(RequestError::invalid(format!(
                    "invalid header name '{}'",
                    name
                )));
            }
            if !headers::is_valid_value(value) {
                return Err(RequestError::invalid(format!(
                    "invalid value for header '{}'",
                    name
                )));
            }
        }

        Ok(())
    }
}
