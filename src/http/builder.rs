//! Fluent request builder.

use crate::error::RequestError;
use crate::http::body::Body;
use crate::http::descriptor::RequestDescriptor;
use crate::http::headers::Headers;
use crate::http::params;
use crate::http::request::{Request, RequestMethod};

/// Builds a [`Request`] for any [`RequestMethod`].
///
/// Mutators take `&mut self` and return the builder so calls can be chained.
/// The URL is kept as given until it is needed: [`add_param`](Self::add_param)
/// and [`build`](Self::build) parse it and report a malformed URL right away.
///
/// ```
/// use relay::http::{RequestBuilder, RequestMethod};
///
/// let request = RequestBuilder::new(RequestMethod::Get, "http://x/api")
///     .add_param("q", "a b")?
///     .build()?;
/// assert_eq!(request.url().as_str(), "http://x/api?q=a%20b");
/// # Ok::<(), relay::RequestError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: RequestMethod,
    url: String,
    headers: Headers,
    body: Option<Body>,
}

impl RequestBuilder {
    /// Create a builder for a JSON-speaking endpoint: `accept: application/json`
    /// is set and can be overwritten with [`add_header`](Self::add_header).
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        let mut builder = Self::bare(method, url);
        builder.add_header("accept", "application/json");
        builder
    }

    /// Create a builder without default headers.
    pub fn bare(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, url)
    }

    /// Rebuild a request received from a remote caller.
    ///
    /// Headers and params are applied in descriptor order; a missing body
    /// becomes an empty byte body.
    pub fn from_descriptor(descriptor: &RequestDescriptor) -> Result<Self, RequestError> {
        let method: RequestMethod = descriptor.method.parse()?;
        let mut builder = Self::new(method, descriptor.url.clone());

        for (name, value) in &descriptor.headers {
            builder.add_header(name, value.clone());
        }
        for (name, value) in &descriptor.params {
            builder.add_param(name, value)?;
        }
        builder.add_body(descriptor.body.clone().unwrap_or_default());

        Ok(builder)
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The URL as it currently stands, including merged params.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set a header. An existing header with the same name, compared
    /// case-insensitively, is replaced.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a query parameter to the URL.
    pub fn add_param(
        &mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<&mut Self, RequestError> {
        let url = params::append_param(&self.url, name.as_ref(), value.as_ref())?;
        self.url = url.into();
        Ok(self)
    }

    /// Set the body, replacing any previous one.
    pub fn add_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Snapshot the builder into a [`Request`].
    pub fn build(&self) -> Result<Request, RequestError> {
        let url = params::parse_url(&self.url)?;
        Ok(Request::new(
            self.method,
            url,
            self.headers.clone(),
            self.body.clone(),
        ))
    }
}

impl TryFrom<&RequestDescriptor> for RequestBuilder {
    type Error = RequestError;

    fn try_from(descriptor: &RequestDescriptor) -> Result<Self, Self::Error> {
        Self::from_descriptor(descriptor)
    }
}
