//! `spiderline chains`: show what the configured middlewares load into.

use serde::Serialize;
use tabled::Tabled;

use spiderline_core::error::AppError;
use spiderline_middleware::{Hook, MiddlewareManager};

use crate::output::{self, OutputFormat};

/// One configured middleware
#[derive(Debug, Serialize, Tabled)]
pub struct MiddlewareRow {
    /// Row number
    #[tabled(rename = "#")]
    pub position: usize,
    /// Registered name
    #[tabled(rename = "Name")]
    pub name: String,
    /// `enabled` or `disabled`
    #[tabled(rename = "Status")]
    pub status: String,
    /// Hooks provided
    #[tabled(rename = "Hooks")]
    pub hooks: String,
    /// Reason for being disabled
    #[tabled(rename = "Reason")]
    pub reason: String,
}

/// One hook chain in execution order
#[derive(Debug, Serialize, Tabled)]
pub struct ChainRow {
    /// Hook name
    #[tabled(rename = "Hook")]
    pub hook: String,
    /// Middlewares in execution order
    #[tabled(rename = "Order")]
    pub order: String,
}

#[derive(Debug, Serialize)]
struct ChainsReport<'a> {
    middlewares: &'a [MiddlewareRow],
    chains: &'a [ChainRow],
}

/// Print the loaded middlewares and chains.
pub async fn execute(manager: &MiddlewareManager, format: OutputFormat) -> Result<(), AppError> {
    let snapshot = manager.snapshot().await;

    let mut rows: Vec<MiddlewareRow> = snapshot
        .enabled()
        .map(|(name, middleware)| {
            let capabilities = middleware.capabilities();
            let hooks: Vec<&str> = [Hook::Input, Hook::Output, Hook::Exception]
                .into_iter()
                .filter(|hook| capabilities.provides(*hook))
                .map(|hook| hook.as_str())
                .collect();
            MiddlewareRow {
                position: 0,
                name: name.to_string(),
                status: "enabled".to_string(),
                hooks: hooks.join(", "),
                reason: String::new(),
            }
        })
        .collect();
    rows.extend(snapshot.disabled().iter().map(|disabled| MiddlewareRow {
        position: 0,
        name: disabled.name.clone(),
        status: "disabled".to_string(),
        hooks: String::new(),
        reason: disabled.reason.clone().unwrap_or_default(),
    }));
    for (index, row) in rows.iter_mut().enumerate() {
        row.position = index + 1;
    }

    let chains: Vec<ChainRow> = [Hook::Input, Hook::Output, Hook::Exception]
        .into_iter()
        .map(|hook| ChainRow {
            hook: hook.to_string(),
            order: snapshot.chains().names(hook).join(" -> "),
        })
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&ChainsReport {
            middlewares: &rows,
            chains: &chains,
        }),
        OutputFormat::Table => {
            output::print_heading("Spider middlewares", format);
            output::print_list(&rows, format);
            output::print_heading("Hook chains", format);
            output::print_list(&chains, format);
        }
    }

    Ok(())
}
