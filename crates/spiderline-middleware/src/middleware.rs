//! The spider middleware trait and the values its hooks return.

use std::fmt;
use std::ops::BitOr;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use spiderline_core::error::AppError;
use spiderline_core::result::AppResult;
use spiderline_core::types::{ResultItem, ResultStream, Response, Spider};

/// The three hooks a middleware can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Runs before the request callback, in load order.
    Input,
    /// Runs over the callback output, in reverse load order.
    Output,
    /// Runs when the input stage or the callback fails, in reverse load order.
    Exception,
}

impl Hook {
    /// Returns the hook method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "process_input",
            Self::Output => "process_output",
            Self::Exception => "process_exception",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The hooks a middleware actually implements.
///
/// Only hooks flagged here are placed into chains; the default trait bodies
/// of the others are never called by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookCapabilities {
    /// Provides `process_input`.
    pub input: bool,
    /// Provides `process_output`.
    pub output: bool,
    /// Provides `process_exception`.
    pub exception: bool,
}

impl HookCapabilities {
    /// No hooks.
    pub const NONE: Self = Self {
        input: false,
        output: false,
        exception: false,
    };
    /// Input hook only.
    pub const INPUT: Self = Self {
        input: true,
        ..Self::NONE
    };
    /// Output hook only.
    pub const OUTPUT: Self = Self {
        output: true,
        ..Self::NONE
    };
    /// Exception hook only.
    pub const EXCEPTION: Self = Self {
        exception: true,
        ..Self::NONE
    };
    /// All three hooks.
    pub const ALL: Self = Self {
        input: true,
        output: true,
        exception: true,
    };

    /// Returns whether `hook` is provided.
    pub fn provides(&self, hook: Hook) -> bool {
        match hook {
            Hook::Input => self.input,
            Hook::Output => self.output,
            Hook::Exception => self.exception,
        }
    }
}

impl BitOr for HookCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            input: self.input || rhs.input,
            output: self.output || rhs.output,
            exception: self.exception || rhs.exception,
        }
    }
}

/// What a hook hands back to the pipeline.
pub enum HookResult {
    /// No opinion; move on to the next hook.
    Continue,
    /// Results that replace the downstream stage's output. An empty stream
    /// still counts.
    Items(ResultStream),
}

impl HookResult {
    /// Short-circuits with an eagerly built list of results.
    pub fn items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ResultItem>,
        I::IntoIter: Send + 'static,
    {
        Self::Items(stream::iter(items).boxed())
    }

    /// Short-circuits with no results.
    pub fn empty() -> Self {
        Self::Items(stream::empty().boxed())
    }

    /// Returns whether this is `Continue`.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

impl fmt::Debug for HookResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "Continue"),
            Self::Items(_) => write!(f, "Items(..)"),
        }
    }
}

/// A spider middleware.
///
/// Instances are built once per load and shared by every concurrent
/// `scrape`, so hooks take `&self`; a middleware that needs per-request state
/// has to manage it internally.
#[async_trait]
pub trait SpiderMiddleware: Send + Sync + fmt::Debug {
    /// Returns the middleware name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns the hooks this middleware provides.
    fn capabilities(&self) -> HookCapabilities;

    /// Inspects a response before it reaches the callback.
    ///
    /// Return `Continue` to let the next hook run, `Items` to skip the
    /// callback and the remaining input hooks, or an error to hand the
    /// response to the exception chain.
    async fn process_input(&self, _response: &Response, _spider: &Spider) -> AppResult<HookResult> {
        Ok(HookResult::Continue)
    }

    /// Transforms the result stream. Must return `Items`.
    async fn process_output(
        &self,
        _response: &Response,
        result: ResultStream,
        _spider: &Spider,
    ) -> AppResult<HookResult> {
        Ok(HookResult::Items(result))
    }

    /// Gets a chance to recover from a failure of the input stage or callback.
    ///
    /// Return `Items` to replace the failed output, `Continue` to pass the
    /// error on.
    async fn process_exception(
        &self,
        _response: &Response,
        _error: &AppError,
        _spider: &Spider,
    ) -> AppResult<HookResult> {
        Ok(HookResult::Continue)
    }
}
