//! Spider middleware configuration.
//!
//! The enabled middleware list is assembled from two maps of
//! `name -> order`: `base` holds the shipped defaults and `custom` the
//! project overrides. Names listed in `disabled` are removed after merging.
//! The result is sorted by ascending order; the lowest order sits closest to
//! the engine, so its input hook runs first and its output hook runs last.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Spider middleware section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiderMiddlewareConfig {
    /// Default middlewares and their orders.
    #[serde(default = "default_base")]
    pub base: BTreeMap<String, i64>,
    /// Project middlewares; an entry here overrides the base order.
    #[serde(default)]
    pub custom: BTreeMap<String, i64>,
    /// Middlewares removed from the merged list.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Non-2xx statuses passed to the spider anyway.
    #[serde(default)]
    pub httperror_allowed_codes: Vec<u16>,
    /// Pass every response to the spider regardless of status.
    #[serde(default)]
    pub httperror_allow_all: bool,
    /// Maximum URL length for follow-up requests (0 disables the check).
    #[serde(default = "default_urllength_limit")]
    pub urllength_limit: usize,
    /// Maximum crawl depth (0 = unlimited).
    #[serde(default)]
    pub depth_limit: u32,
    /// Priority adjustment per depth level.
    #[serde(default)]
    pub depth_priority: i32,
    /// Whether off-site requests are filtered.
    #[serde(default = "default_true")]
    pub offsite_enabled: bool,
}

impl Default for SpiderMiddlewareConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            custom: BTreeMap::new(),
            disabled: Vec::new(),
            httperror_allowed_codes: Vec::new(),
            httperror_allow_all: false,
            urllength_limit: default_urllength_limit(),
            depth_limit: 0,
            depth_priority: 0,
            offsite_enabled: true,
        }
    }
}

impl SpiderMiddlewareConfig {
    /// Returns the merged middleware names in load order.
    pub fn ordered_names(&self) -> Vec<String> {
        let mut merged = self.base.clone();
        merged.extend(self.custom.iter().map(|(name, order)| (name.clone(), *order)));
        for name in &self.disabled {
            merged.remove(name);
        }

        let mut entries: Vec<(String, i64)> = merged.into_iter().collect();
        // BTreeMap iteration already sorted by name; stable sort keeps that for ties.
        entries.sort_by_key(|(_, order)| *order);
        entries.into_iter().map(|(name, _)| name).collect()
    }
}

fn default_base() -> BTreeMap<String, i64> {
    BTreeMap::from([
        ("http_error".to_string(), 50),
        ("offsite".to_string(), 500),
        ("url_length".to_string(), 800),
        ("depth".to_string(), 900),
    ])
}

fn default_urllength_limit() -> usize {
    2083
}

fn default_true() -> bool {
    true
}
