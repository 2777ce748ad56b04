//! Values flowing through the spider middleware pipeline.

pub mod item;
pub mod output;
pub mod request;
pub mod response;
pub mod spider;

pub use item::{Item, ResultItem};
pub use output::{CallbackOutput, ResultStream};
pub use request::{Callback, Request, RequestId};
pub use response::Response;
pub use spider::Spider;
