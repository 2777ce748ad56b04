//! # spiderline-middleware
//!
//! Spider middleware framework for spiderline. Provides:
//!
//! - The [`SpiderMiddleware`] trait with optional input, output and
//!   exception hooks
//! - Hook chains assembled from the enabled middlewares (input in load
//!   order, output and exception in reverse)
//! - A registry that loads middlewares from an ordered list and swaps in an
//!   immutable snapshot on every load
//! - The [`MiddlewareManager::scrape`] pipeline, handler dispatch and the
//!   output validator
//! - Built-in middlewares for HTTP status filtering, off-site filtering,
//!   URL length limits and crawl depth

pub mod builtin;
pub mod catalog;
pub mod chain;
pub mod closure;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod middleware;
pub mod prelude;
pub mod registry;
pub mod validator;

pub use catalog::{MiddlewareCatalog, MiddlewareSpec};
pub use chain::HookChains;
pub use closure::ClosureMiddleware;
pub use error::BuildError;
pub use manager::MiddlewareManager;
pub use middleware::{Hook, HookCapabilities, HookResult, SpiderMiddleware};
pub use registry::{DisabledMiddleware, MiddlewareRegistry, MiddlewareSnapshot};
