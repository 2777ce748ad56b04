//! Middleware registry: loads middlewares and publishes immutable snapshots.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::error::{AppError, ErrorKind};
use spiderline_core::result::AppResult;

use crate::catalog::MiddlewareSpec;
use crate::chain::HookChains;
use crate::error::BuildError;
use crate::middleware::SpiderMiddleware;

/// A middleware that declined to activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledMiddleware {
    /// Registered name.
    pub name: String,
    /// Reason given by the middleware, if any.
    pub reason: Option<String>,
}

/// Result of one `load`: enabled and disabled middlewares plus the chains
/// built from the enabled ones. Never mutated after construction.
#[derive(Debug, Default)]
pub struct MiddlewareSnapshot {
    /// Enabled middlewares in load order.
    enabled: Vec<(String, Arc<dyn SpiderMiddleware>)>,
    /// Disabled middlewares in load order.
    disabled: Vec<DisabledMiddleware>,
    /// Hook chains.
    chains: HookChains,
}

impl MiddlewareSnapshot {
    /// Constructs every spec in order and assembles the chains.
    ///
    /// `NotConfigured` moves a middleware to the disabled set. A fatal build
    /// error or a repeated name aborts with an error.
    pub fn build(specs: &[MiddlewareSpec], settings: &SpiderMiddlewareConfig) -> AppResult<Self> {
        let mut snapshot = Self::default();

        for spec in specs {
            if snapshot.contains(&spec.name) {
                return Err(AppError::configuration(format!(
                    "Spider middleware '{}' is listed more than once",
                    spec.name
                )));
            }

            match spec.build(settings) {
                Ok(middleware) => {
                    snapshot.chains.add(middleware.clone());
                    snapshot.enabled.push((spec.name.clone(), middleware));
                }
                Err(BuildError::NotConfigured(reason)) => {
                    if let Some(reason) = &reason {
                        info!(middleware = %spec.name, reason = %reason, "Spider middleware not configured");
                    }
                    snapshot.disabled.push(DisabledMiddleware {
                        name: spec.name.clone(),
                        reason,
                    });
                }
                Err(BuildError::Fatal(e)) => {
                    let message = format!("Failed to load spider middleware '{}': {}", spec.name, e);
                    return Err(AppError::with_source(ErrorKind::Middleware, message, e));
                }
            }
        }

        Ok(snapshot)
    }

    /// Returns the enabled middleware names in load order.
    pub fn enabled_names(&self) -> Vec<String> {
        self.enabled.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Returns the enabled middlewares in load order.
    pub fn enabled(&self) -> impl Iterator<Item = (&str, &Arc<dyn SpiderMiddleware>)> {
        self.enabled.iter().map(|(name, mw)| (name.as_str(), mw))
    }

    /// Returns the disabled middlewares.
    pub fn disabled(&self) -> &[DisabledMiddleware] {
        &self.disabled
    }

    /// Gets an enabled middleware by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SpiderMiddleware>> {
        self.enabled
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, mw)| mw.clone())
    }

    /// Returns whether `name` is enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|(n, _)| n == name)
    }

    /// Returns whether `name` is disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.name == name)
    }

    /// Returns the hook chains.
    pub fn chains(&self) -> &HookChains {
        &self.chains
    }

    fn contains(&self, name: &str) -> bool {
        self.is_enabled(name) || self.is_disabled(name)
    }
}

/// Holds the current snapshot.
///
/// `load` builds a complete snapshot before swapping it in, so readers see
/// either the old set or the new one. A `scrape` that already cloned the old
/// snapshot finishes with it.
#[derive(Debug, Default)]
pub struct MiddlewareRegistry {
    /// Current snapshot.
    snapshot: RwLock<Arc<MiddlewareSnapshot>>,
}

impl MiddlewareRegistry {
    /// Creates a registry with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded middlewares with the ones built from `specs`.
    ///
    /// On error the previous snapshot stays in place.
    pub async fn load(
        &self,
        specs: &[MiddlewareSpec],
        settings: &SpiderMiddlewareConfig,
    ) -> AppResult<()> {
        let snapshot = MiddlewareSnapshot::build(specs, settings)?;

        debug!(
            middlewares = %snapshot.enabled_names().join(", "),
            "Enabled spider middlewares"
        );

        *self.snapshot.write().await = Arc::new(snapshot);
        Ok(())
    }

    /// Returns the current snapshot.
    pub async fn snapshot(&self) -> Arc<MiddlewareSnapshot> {
        self.snapshot.read().await.clone()
    }
}
