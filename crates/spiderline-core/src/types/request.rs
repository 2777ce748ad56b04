//! Fetch requests and the callbacks attached to them.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::output::CallbackOutput;
use super::response::Response;
use crate::result::AppResult;

/// Unique identifier assigned to every request at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type CallbackFn = dyn Fn(Response) -> BoxFuture<'static, AppResult<CallbackOutput>> + Send + Sync;

/// Continuation invoked with the response fetched for a request.
#[derive(Clone)]
pub struct Callback {
    /// Name used in log lines.
    name: Arc<str>,
    /// The continuation itself.
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wraps an async closure as a named callback.
    pub fn new<F, Fut>(name: &str, func: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<CallbackOutput>> + Send + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(
                move |response: Response| -> BoxFuture<'static, AppResult<CallbackOutput>> {
                    Box::pin(func(response))
                },
            ),
        }
    }

    /// Returns the callback name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the callback with a response.
    pub async fn invoke(&self, response: Response) -> AppResult<CallbackOutput> {
        (self.func)(response).await
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A request to fetch a URL, optionally carrying the callback that will
/// parse its response.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request identifier.
    pub id: RequestId,
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Arbitrary metadata propagated to the response.
    pub meta: HashMap<String, Value>,
    /// Scheduling priority (higher runs first).
    pub priority: i32,
    /// Attached continuation.
    callback: Option<Callback>,
}

impl Request {
    /// Creates a `GET` request without a callback.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            meta: HashMap::new(),
            priority: 0,
            callback: None,
        }
    }

    /// Attaches a callback.
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Attaches an async closure as the callback.
    pub fn with_callback_fn<F, Fut>(self, name: &str, func: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<CallbackOutput>> + Send + 'static,
    {
        self.with_callback(Callback::new(name, func))
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_uppercase();
        self
    }

    /// Inserts a header.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Inserts a metadata value.
    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    /// Sets the scheduling priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the attached callback, if any.
    pub fn callback(&self) -> Option<&Callback> {
        self.callback.as_ref()
    }

    /// Returns whether a callback is attached.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.method, self.url)
    }
}
