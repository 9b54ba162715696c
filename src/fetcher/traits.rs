use std::time::Duration;

use thiserror::Error;

use crate::domain::ParsedDocument;

/// Everything that can go wrong between issuing the request and holding a
/// parsed document. A fetch either succeeds completely or fails with one of
/// these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed URL {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("feed parsing failed: {0}")]
    Parse(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Timeout applied when callers have no deadline of their own.
    fn default_timeout(&self) -> Duration;

    /// Fetch and parse the document at `url`, giving up after `timeout`.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<ParsedDocument, FetchError>;
}
