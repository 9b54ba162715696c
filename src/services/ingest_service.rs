use chrono::{DateTime, Utc};

use crate::domain::{CreateOutcome, NewEntry, ParsedDocument};
use crate::errors::GatorError;
use crate::storage::traits::EntryRepository;

/// Aggregate result of ingesting one document. Only used for logging.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<GatorError>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.errors.len()
    }
}

/// Parse an RSS publish date (RFC 2822, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`).
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct IngestService<E: EntryRepository> {
    entries: E,
}

impl<E: EntryRepository> IngestService<E> {
    pub fn new(entries: E) -> Self {
        Self { entries }
    }

    /// Write the document's items for `feed_id`, skipping ones already stored.
    ///
    /// Best effort per item: a duplicate is counted as skipped, any other
    /// failure is collected and the next item is still attempted.
    pub fn ingest(&self, feed_id: i64, document: &ParsedDocument) -> IngestReport {
        let mut report = IngestReport::default();

        for item in &document.items {
            let link = item.link.trim();
            if link.is_empty() {
                report
                    .errors
                    .push(GatorError::InvalidEntry(format!("{:?} has no link", item.title)));
                continue;
            }

            let published = parse_pub_date(&item.pub_date);
            if published.is_none() && !item.pub_date.is_empty() {
                tracing::debug!(feed_id, pub_date = %item.pub_date, "Unparseable publish date");
            }

            let entry = NewEntry::new(feed_id, item.title.clone(), link.to_string())
                .with_description(item.description.clone())
                .with_published(published);

            match self.entries.create_entry(&entry) {
                Ok(CreateOutcome::Created(id)) => {
                    report.created += 1;
                    tracing::debug!(feed_id, entry_id = id, title = %entry.title, "Created entry");
                }
                Ok(CreateOutcome::Duplicate) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(feed_id, link = %entry.url, error = %e, "Couldn't create entry");
                    report.errors.push(e);
                }
            }
        }

        report
    }
}
