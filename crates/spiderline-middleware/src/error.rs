//! Errors raised while constructing middlewares.

use spiderline_core::error::AppError;
use thiserror::Error;

/// Failure returned by a middleware factory.
///
/// `NotConfigured` is the only non-fatal variant: the registry moves the
/// middleware into the disabled set and keeps loading the rest.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The middleware declined to activate, optionally saying why.
    #[error("middleware not configured{}", .0.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    NotConfigured(Option<String>),
    /// Construction failed; aborts the whole load.
    #[error(transparent)]
    Fatal(#[from] AppError),
}

impl BuildError {
    /// Not configured, with a reason worth logging.
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured(Some(reason.into()))
    }

    /// Not configured, silently.
    pub fn disabled() -> Self {
        Self::NotConfigured(None)
    }
}
