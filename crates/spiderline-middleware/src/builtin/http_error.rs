//! Filters out unsuccessful responses before they reach the callback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::error::{AppError, ErrorKind};
use spiderline_core::result::AppResult;
use spiderline_core::types::{Response, Spider};

use crate::error::BuildError;
use crate::middleware::{HookCapabilities, HookResult, SpiderMiddleware};

/// Meta key: pass every status of this response to the callback.
pub const META_ALLOW_ALL: &str = "handle_httpstatus_all";
/// Meta key: list of extra statuses passed to the callback.
pub const META_ALLOW_LIST: &str = "handle_httpstatus_list";

/// Raises an `HttpError` for non-2xx responses the spider did not opt into,
/// and swallows that error again in its exception hook.
#[derive(Debug, Clone, Default)]
pub struct HttpErrorMiddleware {
    /// Statuses always allowed through.
    allowed_codes: Vec<u16>,
    /// Allow every status.
    allow_all: bool,
}

impl HttpErrorMiddleware {
    /// Catalog name.
    pub const NAME: &'static str = "http_error";

    /// Creates the middleware.
    pub fn new(allowed_codes: Vec<u16>, allow_all: bool) -> Self {
        Self {
            allowed_codes,
            allow_all,
        }
    }

    /// Catalog factory.
    pub fn from_settings(
        settings: &SpiderMiddlewareConfig,
    ) -> Result<Arc<dyn SpiderMiddleware>, BuildError> {
        Ok(Arc::new(Self::new(
            settings.httperror_allowed_codes.clone(),
            settings.httperror_allow_all,
        )))
    }

    fn is_allowed(&self, response: &Response) -> bool {
        if response.is_success() || self.allow_all {
            return true;
        }
        if response
            .meta
            .get(META_ALLOW_ALL)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            return true;
        }
        // A per-request list replaces the configured one.
        match response.meta.get(META_ALLOW_LIST).and_then(|v| v.as_array()) {
            Some(list) => list
                .iter()
                .filter_map(|v| v.as_u64())
                .any(|code| code == u64::from(response.status)),
            None => self.allowed_codes.contains(&response.status),
        }
    }
}

#[async_trait]
impl SpiderMiddleware for HttpErrorMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> HookCapabilities {
        HookCapabilities::INPUT | HookCapabilities::EXCEPTION
    }

    async fn process_input(&self, response: &Response, _spider: &Spider) -> AppResult<HookResult> {
        if self.is_allowed(response) {
            Ok(HookResult::Continue)
        } else {
            Err(AppError::http_error(response.status, &response.url))
        }
    }

    async fn process_exception(
        &self,
        response: &Response,
        error: &AppError,
        spider: &Spider,
    ) -> AppResult<HookResult> {
        if error.kind != ErrorKind::HttpError {
            return Ok(HookResult::Continue);
        }
        info!(
            spider = %spider,
            status = response.status,
            url = %response.url,
            "Ignoring response: HTTP status code is not handled or not allowed"
        );
        Ok(HookResult::empty())
    }
}
