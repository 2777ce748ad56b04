//! Convenience result type alias for spiderline.

use crate::error::AppError;

/// A specialized `Result` type for spiderline operations.
pub type AppResult<T> = Result<T, AppError>;
