//! Hook chains built from the enabled middlewares.
//!
//! Input hooks run in load order. Output and exception hooks run in reverse
//! load order, so the middleware whose input hook saw the response first is
//! the last to see the results on the way out.

use std::sync::Arc;

use crate::middleware::{Hook, SpiderMiddleware};

/// The three ordered hook chains.
#[derive(Debug, Clone, Default)]
pub struct HookChains {
    /// Input hooks, load order.
    input: Vec<Arc<dyn SpiderMiddleware>>,
    /// Output hooks, reverse load order.
    output: Vec<Arc<dyn SpiderMiddleware>>,
    /// Exception hooks, reverse load order.
    exception: Vec<Arc<dyn SpiderMiddleware>>,
}

impl HookChains {
    /// Creates empty chains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds chains from middlewares given in load order.
    pub fn from_middlewares<I>(middlewares: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SpiderMiddleware>>,
    {
        let mut chains = Self::new();
        for middleware in middlewares {
            chains.add(middleware);
        }
        chains
    }

    /// Adds the next middleware in load order to every chain it has a hook for.
    pub fn add(&mut self, middleware: Arc<dyn SpiderMiddleware>) {
        let capabilities = middleware.capabilities();
        if capabilities.input {
            self.input.push(middleware.clone());
        }
        if capabilities.output {
            self.output.insert(0, middleware.clone());
        }
        if capabilities.exception {
            self.exception.insert(0, middleware);
        }
    }

    /// Returns the chain for a hook in execution order.
    pub fn chain(&self, hook: Hook) -> &[Arc<dyn SpiderMiddleware>] {
        match hook {
            Hook::Input => &self.input,
            Hook::Output => &self.output,
            Hook::Exception => &self.exception,
        }
    }

    /// Returns the middleware names of a chain in execution order.
    pub fn names(&self, hook: Hook) -> Vec<String> {
        self.chain(hook)
            .iter()
            .map(|middleware| middleware.name().to_string())
            .collect()
    }

    /// Returns whether all three chains are empty.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty() && self.exception.is_empty()
    }
}
