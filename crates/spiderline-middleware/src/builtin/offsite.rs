//! Drops follow-up requests pointing outside the spider's domains.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::StreamExt;
use tracing::debug;
use url::Url;

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::result::AppResult;
use spiderline_core::types::{Request, ResultItem, ResultStream, Response, Spider};

use crate::error::BuildError;
use crate::middleware::{HookCapabilities, HookResult, SpiderMiddleware};

/// Meta key: skip the offsite check for this request.
pub const META_DONT_FILTER: &str = "dont_filter";

/// Filters requests whose host is not one of `Spider::allowed_domains` or a
/// subdomain of one. A spider without allowed domains is not restricted.
#[derive(Debug, Clone, Default)]
pub struct OffsiteMiddleware;

impl OffsiteMiddleware {
    /// Catalog name.
    pub const NAME: &'static str = "offsite";

    /// Catalog factory.
    pub fn from_settings(
        settings: &SpiderMiddlewareConfig,
    ) -> Result<Arc<dyn SpiderMiddleware>, BuildError> {
        if !settings.offsite_enabled {
            return Err(BuildError::not_configured("offsite filtering is disabled"));
        }
        Ok(Arc::new(Self))
    }
}

/// Returns whether `request` may be followed by a spider limited to `domains`.
pub fn is_on_site(request: &Request, domains: &[String]) -> bool {
    if domains.is_empty() {
        return true;
    }
    if request
        .meta
        .get(META_DONT_FILTER)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        return true;
    }

    let Some(host) = Url::parse(&request.url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };

    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

#[async_trait]
impl SpiderMiddleware for OffsiteMiddleware {
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
        spider: &Spider,
    ) -> AppResult<HookResult> {
        if spider.allowed_domains.is_empty() {
            return Ok(HookResult::Items(result));
        }

        let domains = spider.allowed_domains.clone();
        let spider = spider.name.clone();
        let filtered = result.filter(move |item| {
            let keep = match item {
                ResultItem::Request(request) => {
                    let on_site = is_on_site(request, &domains);
                    if !on_site {
                        debug!(spider = %spider, request = %request, "Filtered offsite request");
                    }
                    on_site
                }
                ResultItem::Item(_) => true,
            };
            future::ready(keep)
        });

        Ok(HookResult::Items(filtered.boxed()))
    }
}
