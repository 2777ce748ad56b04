//! The spider context handed to every hook.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity and scope of the spider a response belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spider {
    /// Spider name.
    pub name: String,
    /// Domains the spider may follow links into. Empty means any.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

impl Spider {
    /// Creates a spider with no domain restriction.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed_domains: Vec::new(),
        }
    }

    /// Restricts the spider to the given domains.
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Spider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
