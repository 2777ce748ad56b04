//! CLI command definitions and dispatch.

pub mod chains;
pub mod run;

use clap::{Parser, Subcommand};

use spiderline_core::config::AppConfig;
use spiderline_core::error::AppError;
use spiderline_middleware::{MiddlewareCatalog, MiddlewareManager};

use crate::output::OutputFormat;

/// spiderline: inspect and exercise the spider middleware pipeline
#[derive(Debug, Parser)]
#[command(name = "spiderline", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(short = 'c', long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to merge on top of the defaults
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show enabled and disabled middlewares and the hook chains
    Chains,
    /// Run a local response through the pipeline
    Run(run::RunArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let manager = load_manager(config).await?;
        match &self.command {
            Commands::Chains => chains::execute(&manager, self.format).await,
            Commands::Run(args) => run::execute(args, &manager, self.format).await,
        }
    }
}

/// Helper: build the manager from the built-in catalog and the config.
async fn load_manager(config: &AppConfig) -> Result<MiddlewareManager, AppError> {
    let catalog = MiddlewareCatalog::with_builtins();
    MiddlewareManager::from_config(&catalog, config).await
}
