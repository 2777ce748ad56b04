//! Fetched responses.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use serde_json::Value;

use super::request::Request;

/// A fetched response. Cloning is cheap: the body is reference counted.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Raw body.
    pub body: Bytes,
    /// Metadata copied from the originating request.
    pub meta: HashMap<String, Value>,
}

impl Response {
    /// Creates a response with no headers or metadata.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HashMap::new(),
            body: body.into(),
            meta: HashMap::new(),
        }
    }

    /// Creates the response for `request`, inheriting its URL and metadata.
    pub fn for_request(request: &Request, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            meta: request.meta.clone(),
            ..Self::new(request.url.clone(), status, body)
        }
    }

    /// Inserts a header.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.status, self.url)
    }
}
