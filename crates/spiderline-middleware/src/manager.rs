//! Middleware manager: runs a response through the hook chains.
//!
//! A `scrape` call proceeds in four stages:
//!
//! 1. Input hooks run in load order. The first one returning `Items`
//!    short-circuits: its results replace the callback output.
//! 2. Otherwise the response is dispatched to the request callback.
//! 3. If stage 1 or 2 fails, exception hooks run in reverse load order. The
//!    first one returning `Items` recovers; if none does, the error is the
//!    result of the scrape.
//! 4. Output hooks run in reverse load order over the result stream, which
//!    is finally wrapped by the output validator.

use std::sync::Arc;

use tracing::{debug, info};

use spiderline_core::config::AppConfig;
use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::error::AppError;
use spiderline_core::result::AppResult;
use spiderline_core::types::{Request, ResultStream, Response, Spider};

use crate::catalog::{MiddlewareCatalog, MiddlewareSpec};
use crate::chain::HookChains;
use crate::dispatch;
use crate::middleware::{Hook, HookResult};
use crate::registry::{MiddlewareRegistry, MiddlewareSnapshot};
use crate::validator::validate_output;

/// Owns the middleware registry and executes the scrape pipeline.
///
/// The manager can be shared behind an `Arc`; independent `scrape` calls may
/// run concurrently.
#[derive(Debug, Default)]
pub struct MiddlewareManager {
    /// Middleware registry.
    registry: Arc<MiddlewareRegistry>,
}

impl MiddlewareManager {
    /// Creates a manager with no middlewares loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager and loads the middlewares configured in `config`.
    pub async fn from_config(catalog: &MiddlewareCatalog, config: &AppConfig) -> AppResult<Self> {
        let specs = catalog.resolve(&config.spider_middleware)?;
        let manager = Self::new();
        manager.load(&specs, &config.spider_middleware).await?;
        Ok(manager)
    }

    /// Loads (or reloads) middlewares from specs given in load order.
    pub async fn load(
        &self,
        specs: &[MiddlewareSpec],
        settings: &SpiderMiddlewareConfig,
    ) -> AppResult<()> {
        self.registry.load(specs, settings).await
    }

    /// Returns the current middleware snapshot.
    pub async fn snapshot(&self) -> Arc<MiddlewareSnapshot> {
        self.registry.snapshot().await
    }

    /// Returns the middleware registry.
    pub fn registry(&self) -> &Arc<MiddlewareRegistry> {
        &self.registry
    }

    /// Runs `response` for `request` through the middleware pipeline and the
    /// request callback.
    ///
    /// The returned stream is lazy: output hooks that filter or map results
    /// do their work as the stream is polled.
    ///
    /// # Errors
    ///
    /// Returns the original processing error when no exception hook
    /// recovers, any error raised by an exception or output hook, and a
    /// `ContractViolation` when an output hook returns `Continue`.
    pub async fn scrape(
        &self,
        request: Request,
        response: Response,
        spider: &Spider,
    ) -> AppResult<ResultStream> {
        let snapshot = self.registry.snapshot().await;
        let chains = snapshot.chains();

        let result = match Self::process_input(chains, &request, &response, spider).await {
            Ok(result) => result,
            Err(e) if e.is_contract_violation() => return Err(e),
            Err(e) => Self::process_exception(chains, &response, e, spider).await?,
        };

        let result = Self::process_output(chains, &response, result, spider).await?;
        Ok(validate_output(&request, result, spider))
    }

    async fn process_input(
        chains: &HookChains,
        request: &Request,
        response: &Response,
        spider: &Spider,
    ) -> AppResult<ResultStream> {
        for middleware in chains.chain(Hook::Input) {
            match middleware.process_input(response, spider).await? {
                HookResult::Continue => {}
                HookResult::Items(result) => {
                    debug!(
                        middleware = %middleware.name(),
                        request_id = %request.id,
                        "Input hook short-circuited the callback"
                    );
                    return Ok(result);
                }
            }
        }

        dispatch::call(request, response.clone(), spider).await
    }

    async fn process_exception(
        chains: &HookChains,
        response: &Response,
        error: AppError,
        spider: &Spider,
    ) -> AppResult<ResultStream> {
        debug!(
            spider = %spider,
            response = %response,
            error = %error,
            "Routing failure to exception hooks"
        );

        for middleware in chains.chain(Hook::Exception) {
            match middleware.process_exception(response, &error, spider).await? {
                HookResult::Continue => {}
                HookResult::Items(result) => {
                    info!(
                        middleware = %middleware.name(),
                        error = %error,
                        "Exception hook recovered from failure"
                    );
                    return Ok(result);
                }
            }
        }

        Err(error)
    }

    async fn process_output(
        chains: &HookChains,
        response: &Response,
        result: ResultStream,
        spider: &Spider,
    ) -> AppResult<ResultStream> {
        let mut result = result;
        for middleware in chains.chain(Hook::Output) {
            result = match middleware.process_output(response, result, spider).await? {
                HookResult::Items(next) => next,
                HookResult::Continue => {
                    return Err(AppError::contract_violation(format!(
                        "Middleware {}.{} must return a result stream, got Continue",
                        middleware.name(),
                        Hook::Output
                    )));
                }
            };
        }
        Ok(result)
    }
}
