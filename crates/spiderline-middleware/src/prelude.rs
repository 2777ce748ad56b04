//! Prelude for writing middlewares.

pub use async_trait::async_trait;

pub use spiderline_core::error::{AppError, ErrorKind};
pub use spiderline_core::result::AppResult;
pub use spiderline_core::types::{
    Callback, CallbackOutput, Item, Request, ResultItem, ResultStream, Response, Spider,
};

pub use crate::catalog::{MiddlewareCatalog, MiddlewareSpec};
pub use crate::closure::ClosureMiddleware;
pub use crate::error::BuildError;
pub use crate::manager::MiddlewareManager;
pub use crate::middleware::{Hook, HookCapabilities, HookResult, SpiderMiddleware};
