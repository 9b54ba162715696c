use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote syndication source tracked by the store.
///
/// `url` is globally unique. `last_fetched_at` is only ever written by the
/// poll scheduler and never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feed {
    pub fn never_fetched(&self) -> bool {
        self.last_fetched_at.is_none()
    }
}

/// A follow row joined with the names it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFollow {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    pub user_name: String,
    pub feed_name: String,
    pub created_at: DateTime<Utc>,
}
