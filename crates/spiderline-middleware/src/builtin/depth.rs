//! Tracks how deep each request sits in the crawl and enforces a limit.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::StreamExt;
use serde_json::Value;
use tracing::debug;

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::result::AppResult;
use spiderline_core::types::{ResultItem, ResultStream, Response, Spider};

use crate::error::BuildError;
use crate::middleware::{HookCapabilities, HookResult, SpiderMiddleware};

/// Meta key holding the depth of a request. Start requests have depth 0.
pub const META_DEPTH: &str = "depth";

/// Stamps `depth` = response depth + 1 on follow-up requests, adjusts their
/// priority by `depth * priority_step` and drops those deeper than
/// `max_depth` (0 = unlimited).
#[derive(Debug, Clone, Default)]
pub struct DepthMiddleware {
    /// Deepest allowed request.
    max_depth: u32,
    /// Priority lost per depth level (negative values favour deep requests).
    priority_step: i32,
}

impl DepthMiddleware {
    /// Catalog name.
    pub const NAME: &'static str = "depth";

    /// Creates the middleware.
    pub fn new(max_depth: u32, priority_step: i32) -> Self {
        Self {
            max_depth,
            priority_step,
        }
    }

    /// Catalog factory.
    pub fn from_settings(
        settings: &SpiderMiddlewareConfig,
    ) -> Result<Arc<dyn SpiderMiddleware>, BuildError> {
        Ok(Arc::new(Self::new(
            settings.depth_limit,
            settings.depth_priority,
        )))
    }
}

#[async_trait]
impl SpiderMiddleware for DepthMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> HookCapabilities {
        HookCapabilities::OUTPUT
    }

    async fn process_output(
        &self,
        response: &Response,
        result: ResultStream,
        spider: &Spider,
    ) -> AppResult<HookResult> {
        let parent_depth = response
            .meta
            .get(META_DEPTH)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let depth = u32::try_from(parent_depth).unwrap_or(u32::MAX).saturating_add(1);
        let max_depth = self.max_depth;
        let priority_step = self.priority_step;
        let spider = spider.name.clone();

        let stamped = result.filter_map(move |item| {
            let item = match item {
                ResultItem::Request(mut request) => {
                    if max_depth > 0 && depth > max_depth {
                        debug!(
                            spider = %spider,
                            request = %request,
                            max_depth,
                            "Ignoring link: depth exceeds limit"
                        );
                        None
                    } else {
                        request.meta.insert(META_DEPTH.to_string(), Value::from(depth));
                        let penalty = i32::try_from(depth)
                            .unwrap_or(i32::MAX)
                            .saturating_mul(priority_step);
                        request.priority = request.priority.saturating_sub(penalty);
                        Some(ResultItem::Request(request))
                    }
                }
                other => Some(other),
            };
            future::ready(item)
        });

        Ok(HookResult::Items(stamped.boxed()))
    }
}
