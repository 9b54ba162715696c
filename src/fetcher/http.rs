use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use url::Url;

use crate::config::Config;
use crate::domain::ParsedDocument;
use crate::fetcher::parser::parse_document;
use crate::fetcher::traits::{FeedFetcher, FetchError};

const ACCEPT_FEEDS: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

/// Fetches feeds over HTTP with a blocking client.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.user_agent, config.fetch_timeout)
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            url, other
        ))),
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Request(err)
    }
}

impl FeedFetcher for HttpFetcher {
    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch(&self, url: &str, timeout: Duration) -> Result<ParsedDocument, FetchError> {
        let url = validate_url(url)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_FEEDS)
            .timeout(timeout)
            .send()
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().map_err(|e| classify(e, timeout))?;
        parse_document(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Boot.dev Blog</title>
    <link>https://blog.boot.dev/</link>
    <description>Learn to code</description>
    <item>
      <title>The Boot.dev Beat</title>
      <link>https://blog.boot.dev/news/bootdev-beat</link>
      <pubDate>Wed, 01 May 2024 00:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("gator-test/1.0", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_fetch_parses_document_and_sends_headers() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/index.xml")
            .match_header("user-agent", "gator-test/1.0")
            .match_header("accept", mockito::Matcher::Regex("application/rss\\+xml".to_string()))
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(FEED)
            .create();

        let document = fetcher()
            .fetch(&format!("{}/index.xml", server.url()), Duration::from_secs(5))
            .unwrap();

        mock.assert();
        assert_eq!(document.channel.title, "Boot.dev Blog");
        assert_eq!(document.items.len(), 1);
        assert_eq!(document.items[0].link, "https://blog.boot.dev/news/bootdev-beat");
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/gone.xml")
            .with_status(404)
            .with_body(FEED)
            .create();

        let result = fetcher().fetch(&format!("{}/gone.xml", server.url()), Duration::from_secs(5));
        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/broken.xml")
            .with_status(200)
            .with_body("<rss><channel><title>half")
            .create();

        let result = fetcher().fetch(&format!("{}/broken.xml", server.url()), Duration::from_secs(5));
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_slow_response_hits_timeout() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/slow.xml")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(FEED.as_bytes())
            })
            .create();

        let result = fetcher().fetch(
            &format!("{}/slow.xml", server.url()),
            Duration::from_millis(200),
        );
        assert!(matches!(
            result,
            Err(FetchError::Timeout(_)) | Err(FetchError::Request(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_urls() {
        let result = fetcher().fetch("ftp://example.com/feed.xml", Duration::from_secs(1));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));

        let result = fetcher().fetch("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
