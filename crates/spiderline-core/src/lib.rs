//! # spiderline-core
//!
//! Core crate for spiderline. Contains the request/response/item types that
//! flow through the spider middleware pipeline, configuration schemas, and
//! the unified error system.
//!
//! This crate has **no** internal dependencies on other spiderline crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
