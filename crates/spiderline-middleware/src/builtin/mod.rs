//! Middlewares shipped with spiderline, enabled through the `base` map of the
//! spider middleware config.

pub mod depth;
pub mod http_error;
pub mod offsite;
pub mod url_length;

pub use depth::DepthMiddleware;
pub use http_error::HttpErrorMiddleware;
pub use offsite::OffsiteMiddleware;
pub use url_length::UrlLengthMiddleware;
