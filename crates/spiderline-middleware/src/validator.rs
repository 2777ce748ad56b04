//! Output validator: drops follow-up requests that carry no callback.

use futures::future;
use futures::stream::StreamExt;
use tracing::warn;

use spiderline_core::types::{Request, ResultItem, ResultStream, Spider};

/// Wraps `result` in a lazy filter that removes every request without a
/// callback, logging a warning for each one. Other items pass unchanged.
pub fn validate_output(origin: &Request, result: ResultStream, spider: &Spider) -> ResultStream {
    let origin = origin.to_string();
    let spider = spider.name.clone();

    result
        .filter(move |item| {
            let keep = match item {
                ResultItem::Request(request) => request.has_callback(),
                ResultItem::Item(_) => true,
            };
            if !keep {
                warn!(
                    spider = %spider,
                    request = %item.as_request().map(Request::to_string).unwrap_or_default(),
                    origin = %origin,
                    "Ignoring request returned from spider while processing {}: request has no \
                     callback, attach one with Request::with_callback",
                    origin
                );
            }
            future::ready(keep)
        })
        .boxed()
}
