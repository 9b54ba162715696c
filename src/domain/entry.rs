use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored post. `(feed_id, url)` is unique and is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub feed_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    pub fn new(feed_id: i64, title: String, url: String) -> Self {
        Self {
            feed_id,
            title,
            description: String::new(),
            url,
            published_at: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_published(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }
}

/// Result of inserting an entry. A duplicate key is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(i64),
    Duplicate,
}

/// A post together with the name of the feed it came from, for `browse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub entry: Entry,
    pub feed_name: String,
}
