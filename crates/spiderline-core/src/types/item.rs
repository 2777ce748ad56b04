//! Result items produced by callbacks and middlewares.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::request::Request;

/// A scraped item: an ordered map of JSON fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    /// Field values.
    pub fields: Map<String, Value>,
}

impl Item {
    /// Creates an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field value.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Gets a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Gets a string field value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

/// One element of a result stream: either a follow-up request to schedule or
/// an extracted item.
#[derive(Debug, Clone)]
pub enum ResultItem {
    /// A new request to fetch.
    Request(Request),
    /// An extracted item.
    Item(Item),
}

impl ResultItem {
    /// Returns the request if this is one.
    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Self::Request(request) => Some(request),
            Self::Item(_) => None,
        }
    }

    /// Returns the item if this is one.
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Request(_) => None,
            Self::Item(item) => Some(item),
        }
    }
}

impl From<Request> for ResultItem {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

impl From<Item> for ResultItem {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}
