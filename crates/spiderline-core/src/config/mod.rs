//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod middleware;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::middleware::SpiderMiddlewareConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Deserialization target for the merged TOML configuration files
/// (`default.toml` + environment overlay + `SPIDERLINE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Spider middleware ordering and per-middleware settings.
    #[serde(default)]
    pub spider_middleware: SpiderMiddlewareConfig,
}

impl AppConfig {
    /// Load configuration from TOML files in `dir`.
    ///
    /// Merges `{dir}/default.toml` with the `{dir}/{env}.toml` overlay and
    /// environment variables prefixed with `SPIDERLINE__`. Missing files are
    /// skipped, so an empty directory yields the built-in defaults.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SPIDERLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
