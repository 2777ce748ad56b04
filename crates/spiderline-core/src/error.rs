//! Unified application error types for spiderline.
//!
//! Middlewares, callbacks and the pipeline itself all report failures as
//! [`AppError`]. The [`ErrorKind`] decides how the pipeline treats them:
//! contract violations fail a scrape immediately, everything else raised
//! before the output stage is offered to the exception chain first.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A configuration error occurred.
    Configuration,
    /// A middleware hook returned a value outside its allowed shape.
    ContractViolation,
    /// A middleware hook failed while processing a response.
    Processing,
    /// The request callback is missing or failed.
    Callback,
    /// The response carries an HTTP status the spider did not ask for.
    HttpError,
    /// A middleware could not be constructed or registered.
    Middleware,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::ContractViolation => write!(f, "CONTRACT_VIOLATION"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Callback => write!(f, "CALLBACK"),
            Self::HttpError => write!(f, "HTTP_ERROR"),
            Self::Middleware => write!(f, "MIDDLEWARE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout spiderline.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a contract-violation error.
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContractViolation, message)
    }

    /// Create a processing error.
    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Processing, message)
    }

    /// Create a callback error.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Callback, message)
    }

    /// Create an HTTP status error.
    pub fn http_error(status: u16, url: &str) -> Self {
        Self::new(
            ErrorKind::HttpError,
            format!("Ignoring non-200 response ({status}) for {url}"),
        )
    }

    /// Create a middleware error.
    pub fn middleware(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Middleware, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns whether this error must bypass the exception chain.
    pub fn is_contract_violation(&self) -> bool {
        self.kind == ErrorKind::ContractViolation
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
