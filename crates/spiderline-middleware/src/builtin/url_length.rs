//! Drops follow-up requests with overly long URLs.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::StreamExt;
use tracing::debug;

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::result::AppResult;
use spiderline_core::types::{ResultItem, ResultStream, Response, Spider};

use crate::error::BuildError;
use crate::middleware::{HookCapabilities, HookResult, SpiderMiddleware};

/// Filters requests whose URL is longer than `max_length` bytes.
#[derive(Debug, Clone)]
pub struct UrlLengthMiddleware {
    /// Longest URL allowed through.
    max_length: usize,
}

impl UrlLengthMiddleware {
    /// Catalog name.
    pub const NAME: &'static str = "url_length";

    /// Creates the middleware.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Catalog factory. A limit of 0 disables the middleware.
    pub fn from_settings(
        settings: &SpiderMiddlewareConfig,
    ) -> Result<Arc<dyn SpiderMiddleware>, BuildError> {
        if settings.urllength_limit == 0 {
            return Err(BuildError::disabled());
        }
        Ok(Arc::new(Self::new(settings.urllength_limit)))
    }
}

#[async_trait]
impl SpiderMiddleware for UrlLengthMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> HookCapabilities {
        HookCapabilities::OUTPUT
    }

    async fn process_output(
        &self,
        _response: &Response,
        result: ResultStream,
        _spider: &Spider,
    ) -> AppResult<HookResult> {
        let max_length = self.max_length;
        let filtered = result.filter(move |item| {
            let keep = match item {
                ResultItem::Request(request) if request.url.len() > max_length => {
                    debug!(
                        request = %request,
                        max_length,
                        "Ignoring link: URL length exceeds limit"
                    );
                    false
                }
                _ => true,
            };
            future::ready(keep)
        });
        Ok(HookResult::Items(filtered.boxed()))
    }
}
