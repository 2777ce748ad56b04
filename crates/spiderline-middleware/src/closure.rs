//! Middlewares assembled from async closures.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use spiderline_core::error::AppError;
use spiderline_core::result::AppResult;
use spiderline_core::types::{ResultStream, Response, Spider};

use crate::middleware::{HookCapabilities, HookResult, SpiderMiddleware};

type HookFuture = BoxFuture<'static, AppResult<HookResult>>;
type InputFn = Arc<dyn Fn(Response, Spider) -> HookFuture + Send + Sync>;
type OutputFn = Arc<dyn Fn(Response, ResultStream, Spider) -> HookFuture + Send + Sync>;
type ExceptionFn = Arc<dyn Fn(Response, AppError, Spider) -> HookFuture + Send + Sync>;

/// A middleware whose hooks are closures.
///
/// Each closure receives owned copies of its arguments, so the returned
/// future can be `'static`. The capabilities are exactly the hooks that were
/// set.
pub struct ClosureMiddleware {
    /// Middleware name.
    name: String,
    /// Input hook.
    input: Option<InputFn>,
    /// Output hook.
    output: Option<OutputFn>,
    /// Exception hook.
    exception: Option<ExceptionFn>,
}

impl std::fmt::Debug for ClosureMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureMiddleware")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

impl ClosureMiddleware {
    /// Creates a middleware with no hooks.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input: None,
            output: None,
            exception: None,
        }
    }

    /// Sets the input hook.
    pub fn on_input<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response, Spider) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookResult>> + Send + 'static,
    {
        self.input = Some(Arc::new(
            move |response: Response, spider: Spider| -> HookFuture {
                Box::pin(hook(response, spider))
            },
        ));
        self
    }

    /// Sets the output hook.
    pub fn on_output<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response, ResultStream, Spider) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookResult>> + Send + 'static,
    {
        self.output = Some(Arc::new(
            move |response: Response, result: ResultStream, spider: Spider| -> HookFuture {
                Box::pin(hook(response, result, spider))
            },
        ));
        self
    }

    /// Sets the exception hook.
    ///
    /// The closure receives a clone of the error, which keeps its kind and
    /// message but not its `source`. Implement [`SpiderMiddleware`] directly
    /// when recovery depends on the underlying cause.
    pub fn on_exception<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Response, AppError, Spider) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookResult>> + Send + 'static,
    {
        self.exception = Some(Arc::new(
            move |response: Response, error: AppError, spider: Spider| -> HookFuture {
                Box::pin(hook(response, error, spider))
            },
        ));
        self
    }

    /// Wraps the middleware into an `Arc<dyn SpiderMiddleware>`.
    pub fn into_arc(self) -> Arc<dyn SpiderMiddleware> {
        Arc::new(self)
    }
}

#[async_trait]
impl SpiderMiddleware for ClosureMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> HookCapabilities {
        HookCapabilities {
            input: self.input.is_some(),
            output: self.output.is_some(),
            exception: self.exception.is_some(),
        }
    }

    async fn process_input(&self, response: &Response, spider: &Spider) -> AppResult<HookResult> {
        match &self.input {
            Some(hook) => hook(response.clone(), spider.clone()).await,
            None => Ok(HookResult::Continue),
        }
    }

    async fn process_output(
        &self,
        response: &Response,
        result: ResultStream,
        spider: &Spider,
    ) -> AppResult<HookResult> {
        match &self.output {
            Some(hook) => hook(response.clone(), result, spider.clone()).await,
            None => Ok(HookResult::Items(result)),
        }
    }

    async fn process_exception(
        &self,
        response: &Response,
        error: &AppError,
        spider: &Spider,
    ) -> AppResult<HookResult> {
        match &self.exception {
            Some(hook) => hook(response.clone(), error.clone(), spider.clone()).await,
            None => Ok(HookResult::Continue),
        }
    }
}
