//! `spiderline run`: feed a local response through the configured pipeline.

use clap::Args;
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;

use spiderline_core::error::AppError;
use spiderline_core::types::{CallbackOutput, Item, Request, ResultItem, Response, Spider};
use spiderline_middleware::MiddlewareManager;

use crate::output::{self, OutputFormat};

/// Arguments for `spiderline run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// URL the response was fetched from
    pub url: String,

    /// HTTP status of the response
    #[arg(short, long, default_value_t = 200)]
    pub status: u16,

    /// File whose contents become the response body
    #[arg(short, long)]
    pub body_file: Option<String>,

    /// Spider name
    #[arg(long, default_value = "cli")]
    pub spider: String,

    /// Domain the spider is restricted to (repeatable)
    #[arg(long = "allowed-domain")]
    pub allowed_domains: Vec<String>,

    /// Follow-up URL the callback emits as a request (repeatable)
    #[arg(long)]
    pub follow: Vec<String>,
}

/// One result emitted by the pipeline
#[derive(Debug, Serialize, Tabled)]
pub struct ResultRow {
    /// `request` or `item`
    #[tabled(rename = "Kind")]
    pub kind: String,
    /// Request URL or item JSON
    #[tabled(rename = "Value")]
    pub value: String,
    /// Request priority
    #[tabled(rename = "Priority")]
    pub priority: String,
}

/// Run the pipeline once and print what comes out.
pub async fn execute(
    args: &RunArgs,
    manager: &MiddlewareManager,
    format: OutputFormat,
) -> Result<(), AppError> {
    let body = match &args.body_file {
        Some(path) => tokio::fs::read(path).await?,
        None => Vec::new(),
    };

    let follow = args.follow.clone();
    let request = Request::new(args.url.clone()).with_callback_fn("summarize", move |response| {
        let follow = follow.clone();
        async move { Ok(summarize(&response, &follow)) }
    });
    let response = Response::for_request(&request, args.status, body);
    let spider = Spider::new(args.spider.clone()).with_allowed_domains(args.allowed_domains.clone());

    let results: Vec<ResultItem> = manager
        .scrape(request, response, &spider)
        .await?
        .collect()
        .await;

    let rows = results
        .iter()
        .map(|result| match result {
            ResultItem::Request(request) => Ok(ResultRow {
                kind: "request".to_string(),
                value: request.url.clone(),
                priority: request.priority.to_string(),
            }),
            ResultItem::Item(item) => Ok(ResultRow {
                kind: "item".to_string(),
                value: serde_json::to_string(item)?,
                priority: String::new(),
            }),
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    output::print_list(&rows, format);
    Ok(())
}

/// Callback used by `run`: one summary item plus the requested follow-ups.
fn summarize(response: &Response, follow: &[String]) -> CallbackOutput {
    let mut results = vec![ResultItem::from(
        Item::new()
            .with_field("url", response.url.clone())
            .with_field("status", response.status)
            .with_field("bytes", response.body.len()),
    )];
    results.extend(follow.iter().map(|url| {
        ResultItem::from(
            Request::new(url.clone()).with_callback_fn("summarize", |response| async move {
                Ok(summarize(&response, &[]))
            }),
        )
    }));
    CallbackOutput::from(results)
}
