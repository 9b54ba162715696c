use std::time::Duration;

use gator::fetcher::HttpFetcher;
use gator::services::{PollOutcome, PollService};
use gator::storage::sqlite::{
    SqliteEntryRepository, SqliteFeedRepository, SqliteStorage, SqliteUserRepository,
};
use gator::storage::{EntryRepository, FeedRepository, UserRepository};

const DUPLICATE_LINK_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Two items, one link</description>
    <item>
      <title>First</title>
      <link>https://example.com/a</link>
      <description>first copy</description>
      <pubDate>Mon, 15 Jan 2024 12:00:00 +0000</pubDate>
    </item>
    <item>
      <title>First (again)</title>
      <link>https://example.com/a</link>
      <description>second copy</description>
      <pubDate>Mon, 15 Jan 2024 13:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

fn report_counts(outcome: PollOutcome) -> (usize, usize) {
    match outcome {
        PollOutcome::Polled { report, .. } => {
            assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
            (report.created, report.skipped)
        }
        PollOutcome::Idle => panic!("expected the feed to be polled"),
    }
}

#[test]
fn test_poll_cycle_end_to_end() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(DUPLICATE_LINK_FEED)
        .expect(2)
        .create();

    let storage = SqliteStorage::in_memory().unwrap();
    let user = SqliteUserRepository::new(storage.clone()).create("ada").unwrap();
    let feeds = SqliteFeedRepository::new(storage.clone());
    let feed = feeds
        .add("Example", &format!("{}/feed.xml", server.url()), user.id)
        .unwrap();

    let fetcher = HttpFetcher::new("gator-test/1.0", Duration::from_secs(5)).unwrap();
    let poller = PollService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqliteEntryRepository::new(storage.clone()),
        fetcher,
    );

    // The second item repeats the first link within the same document.
    assert_eq!(report_counts(poller.poll_once().unwrap()), (1, 1));
    let first_fetch = feeds.get_by_id(feed.id).unwrap().unwrap().last_fetched_at;
    assert!(first_fetch.is_some());

    // Nothing new the second time round; every item counts as skipped.
    assert_eq!(report_counts(poller.poll_once().unwrap()), (0, 2));

    let second_fetch = feeds.get_by_id(feed.id).unwrap().unwrap().last_fetched_at;
    assert!(second_fetch >= first_fetch);

    let entries = SqliteEntryRepository::new(storage);
    assert_eq!(entries.count_for_feed(feed.id).unwrap(), 1);
    mock.assert();
}

#[test]
fn test_unreachable_feed_still_rotates() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/down.xml").with_status(500).create();
    server
        .mock("GET", "/up.xml")
        .with_status(200)
        .with_body(DUPLICATE_LINK_FEED)
        .create();

    let storage = SqliteStorage::in_memory().unwrap();
    let user = SqliteUserRepository::new(storage.clone()).create("ada").unwrap();
    let feeds = SqliteFeedRepository::new(storage.clone());
    feeds
        .add("Down", &format!("{}/down.xml", server.url()), user.id)
        .unwrap();
    let up = feeds
        .add("Up", &format!("{}/up.xml", server.url()), user.id)
        .unwrap();

    let poller = PollService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqliteEntryRepository::new(storage.clone()),
        HttpFetcher::new("gator-test/1.0", Duration::from_secs(5)).unwrap(),
    );

    assert!(poller.poll_once().is_err());
    match poller.poll_once().unwrap() {
        PollOutcome::Polled { feed, report } => {
            assert_eq!(feed.id, up.id);
            assert_eq!(report.created, 1);
        }
        PollOutcome::Idle => panic!("expected the healthy feed to be polled"),
    }
}
