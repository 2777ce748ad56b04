//! Result streams and callback output normalization.

use std::fmt;

use futures::stream::{self, BoxStream, StreamExt};

use super::item::{Item, ResultItem};
use super::request::Request;

/// Lazy, one-pass stream of result items.
pub type ResultStream = BoxStream<'static, ResultItem>;

/// Whatever a callback hands back for a response.
pub enum CallbackOutput {
    /// No results.
    Nothing,
    /// A single result.
    One(ResultItem),
    /// An eagerly built list of results.
    Many(Vec<ResultItem>),
    /// A lazily produced stream of results.
    Stream(ResultStream),
}

impl CallbackOutput {
    /// Normalizes the output into a stream: nothing becomes an empty stream
    /// and a single result a one-element stream.
    pub fn into_stream(self) -> ResultStream {
        match self {
            Self::Nothing => stream::empty().boxed(),
            Self::One(item) => stream::once(async move { item }).boxed(),
            Self::Many(items) => stream::iter(items).boxed(),
            Self::Stream(stream) => stream,
        }
    }
}

impl fmt::Debug for CallbackOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::One(item) => f.debug_tuple("One").field(item).finish(),
            Self::Many(items) => f.debug_tuple("Many").field(&items.len()).finish(),
            Self::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

impl From<()> for CallbackOutput {
    fn from(_: ()) -> Self {
        Self::Nothing
    }
}

impl From<ResultItem> for CallbackOutput {
    fn from(item: ResultItem) -> Self {
        Self::One(item)
    }
}

impl From<Item> for CallbackOutput {
    fn from(item: Item) -> Self {
        Self::One(ResultItem::Item(item))
    }
}

impl From<Request> for CallbackOutput {
    fn from(request: Request) -> Self {
        Self::One(ResultItem::Request(request))
    }
}

impl From<Vec<ResultItem>> for CallbackOutput {
    fn from(items: Vec<ResultItem>) -> Self {
        Self::Many(items)
    }
}

impl From<ResultStream> for CallbackOutput {
    fn from(stream: ResultStream) -> Self {
        Self::Stream(stream)
    }
}

impl<T: Into<ResultItem>> From<Option<T>> for CallbackOutput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nothing, |item| Self::One(item.into()))
    }
}
