//! Handler dispatch: feeds a response to the request's callback.

use tracing::debug;

use spiderline_core::error::AppError;
use spiderline_core::result::AppResult;
use spiderline_core::types::{Request, ResultStream, Response, Spider};

/// Invokes the callback attached to `request` with `response` and
/// normalizes its output into a result stream.
///
/// # Errors
///
/// Fails with a `Callback` error when the request has no callback, and
/// passes through any error the callback itself returns.
pub async fn call(request: &Request, response: Response, spider: &Spider) -> AppResult<ResultStream> {
    let callback = request.callback().ok_or_else(|| {
        AppError::callback(format!(
            "Request {request} reached the spider without a callback"
        ))
    })?;

    debug!(
        spider = %spider,
        request_id = %request.id,
        callback = %callback.name(),
        "Dispatching response to callback"
    );

    let output = callback.invoke(response).await?;
    Ok(output.into_stream())
}
