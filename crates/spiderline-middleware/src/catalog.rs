//! Name → factory lookup used to turn configured middleware names into
//! constructible specs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use spiderline_core::config::middleware::SpiderMiddlewareConfig;
use spiderline_core::error::AppError;
use spiderline_core::result::AppResult;

use crate::builtin::{DepthMiddleware, HttpErrorMiddleware, OffsiteMiddleware, UrlLengthMiddleware};
use crate::error::BuildError;
use crate::middleware::SpiderMiddleware;

/// Constructs a middleware from the middleware settings.
pub type MiddlewareFactory = Arc<
    dyn Fn(&SpiderMiddlewareConfig) -> Result<Arc<dyn SpiderMiddleware>, BuildError> + Send + Sync,
>;

/// A named, not yet constructed middleware.
#[derive(Clone)]
pub struct MiddlewareSpec {
    /// Name the middleware is registered under.
    pub name: String,
    /// Constructor.
    factory: MiddlewareFactory,
}

impl MiddlewareSpec {
    /// Creates a spec from a factory closure.
    pub fn new<F>(name: &str, factory: F) -> Self
    where
        F: Fn(&SpiderMiddlewareConfig) -> Result<Arc<dyn SpiderMiddleware>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.to_string(),
            factory: Arc::new(factory),
        }
    }

    /// Creates a spec that always yields an already built instance.
    pub fn from_instance(middleware: Arc<dyn SpiderMiddleware>) -> Self {
        let name = middleware.name().to_string();
        Self::new(&name, move |_| Ok(middleware.clone()))
    }

    /// Runs the factory.
    pub fn build(
        &self,
        settings: &SpiderMiddlewareConfig,
    ) -> Result<Arc<dyn SpiderMiddleware>, BuildError> {
        (self.factory)(settings)
    }
}

impl fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareSpec")
            .field("name", &self.name)
            .field("factory", &"<factory>")
            .finish()
    }
}

/// Registry of known middleware factories.
#[derive(Default)]
pub struct MiddlewareCatalog {
    /// Name → factory.
    factories: HashMap<String, MiddlewareFactory>,
}

impl fmt::Debug for MiddlewareCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareCatalog")
            .field("names", &self.names())
            .finish()
    }
}

impl MiddlewareCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the built-in middlewares.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register(HttpErrorMiddleware::NAME, HttpErrorMiddleware::from_settings);
        catalog.register(OffsiteMiddleware::NAME, OffsiteMiddleware::from_settings);
        catalog.register(UrlLengthMiddleware::NAME, UrlLengthMiddleware::from_settings);
        catalog.register(DepthMiddleware::NAME, DepthMiddleware::from_settings);
        catalog
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&SpiderMiddlewareConfig) -> Result<Arc<dyn SpiderMiddleware>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Returns whether a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves the configured middleware list into specs, in load order.
    pub fn resolve(&self, config: &SpiderMiddlewareConfig) -> AppResult<Vec<MiddlewareSpec>> {
        config
            .ordered_names()
            .into_iter()
            .map(|name| {
                let factory = self.factories.get(&name).cloned().ok_or_else(|| {
                    AppError::configuration(format!("Unknown spider middleware '{name}'"))
                })?;
                Ok(MiddlewareSpec { name, factory })
            })
            .collect()
    }
}
