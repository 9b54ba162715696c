use std::time::Duration;

use chrono::Utc;

use crate::domain::Feed;
use crate::errors::{GatorError, GatorResult};
use crate::fetcher::FeedFetcher;
use crate::services::ingest_service::{IngestReport, IngestService};
use crate::services::ticker::Ticker;
use crate::storage::traits::{EntryRepository, FeedRepository};

/// What one poll cycle did.
#[derive(Debug)]
pub enum PollOutcome {
    /// No feed exists yet.
    Idle,
    Polled { feed: Feed, report: IngestReport },
}

/// Drives the select -> mark -> fetch -> ingest cycle.
///
/// The feed is marked as fetched *before* the network call. A slow or
/// failing URL therefore drops to the back of the queue immediately, and a
/// second scheduler sharing the store will pick a different feed. The cost
/// is that a transient failure loses that feed's turn until it comes round
/// again. Restarting at any point is safe for the same reason.
pub struct PollService<F: FeedRepository, E: EntryRepository, X: FeedFetcher> {
    feeds: F,
    ingest: IngestService<E>,
    fetcher: X,
}

impl<F: FeedRepository, E: EntryRepository, X: FeedFetcher> PollService<F, E, X> {
    pub fn new(feeds: F, entries: E, fetcher: X) -> Self {
        Self {
            feeds,
            ingest: IngestService::new(entries),
            fetcher,
        }
    }

    /// Run a single cycle.
    ///
    /// An empty feed pool is `Ok(PollOutcome::Idle)`. Fetch and store
    /// failures are returned; the feed stays marked either way.
    pub fn poll_once(&self) -> GatorResult<PollOutcome> {
        let Some(feed) = self.feeds.claim_next_feed(Utc::now())? else {
            tracing::info!("No feeds to fetch");
            return Ok(PollOutcome::Idle);
        };

        tracing::info!(
            feed_id = feed.id,
            name = %feed.name,
            url = %feed.url,
            "Found a feed to fetch"
        );

        let document = self
            .fetcher
            .fetch(&feed.url, self.fetcher.default_timeout())
            .map_err(|e| {
                tracing::warn!(feed_id = feed.id, url = %feed.url, error = %e, "Couldn't fetch feed");
                GatorError::Fetch(e)
            })?;

        let report = self.ingest.ingest(feed.id, &document);
        tracing::info!(
            feed_id = feed.id,
            name = %feed.name,
            items = document.items.len(),
            created = report.created,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Feed collected"
        );

        Ok(PollOutcome::Polled { feed, report })
    }

    /// Poll immediately and then once per `interval`, forever.
    ///
    /// Feed and store failures are logged and the loop carries on; only a
    /// fatal error ends it.
    pub fn poll_forever(&self, interval: Duration) -> GatorResult<()> {
        self.poll_until(interval, |_| false)
    }

    /// The loop behind [`poll_forever`](Self::poll_forever), ending cleanly
    /// once `stop` returns true for a cycle's result.
    pub fn poll_until<S>(&self, interval: Duration, mut stop: S) -> GatorResult<()>
    where
        S: FnMut(&GatorResult<PollOutcome>) -> bool,
    {
        if interval.is_zero() {
            return Err(GatorError::InvalidDuration(
                "interval must be greater than zero".to_string(),
            ));
        }

        let mut ticker = Ticker::new(interval);
        tracing::info!(interval = ?ticker.interval(), "Collecting feeds");

        loop {
            let result = self.poll_once();

            match &result {
                Err(GatorError::Fetch(_)) => {
                    // Already logged; the feed re-enters the pool on a later tick.
                }
                Err(e) => tracing::error!(error = %e, "Poll cycle failed"),
                Ok(_) => {}
            }

            if stop(&result) {
                return Ok(());
            }
            if let Err(e) = result {
                if e.is_fatal() {
                    return Err(e);
                }
            }

            let missed = ticker.wait();
            if missed > 0 {
                tracing::warn!(missed, "Poll cycle overran its interval; ticks coalesced");
            }
        }
    }
}
