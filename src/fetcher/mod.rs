pub mod http;
pub mod parser;
pub mod traits;

pub use http::HttpFetcher;
pub use parser::parse_document;
pub use traits::{FeedFetcher, FetchError};
