use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};

use crate::domain::Feed;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::FeedRepository;

const FEED_COLUMNS: &str = "id, name, url, user_id, last_fetched_at, created_at, updated_at";

// Monotonic write: a stale timestamp from a slower scheduler never wins.
const MARK_REFRESHED: &str = "last_fetched_at = CASE
        WHEN last_fetched_at IS NULL OR last_fetched_at < ?1 THEN ?1
        ELSE last_fetched_at
    END,
    updated_at = ?1";

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        user_id: row.get(3)?,
        last_fetched_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl FeedRepository for SqliteFeedRepository {
    fn add(&self, name: &str, url: &str, user_id: i64) -> GatorResult<Feed> {
        let conn = self.storage.connection()?;
        let now = Utc::now();

        conn.query_row(
            &format!(
                "INSERT INTO feeds (name, url, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 RETURNING {}",
                FEED_COLUMNS
            ),
            (name, url, user_id, now),
            feed_from_row,
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::FeedAlreadyExists(url.to_string())
            } else {
                GatorError::from(e)
            }
        })
    }

    fn get_all(&self) -> GatorResult<Vec<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feeds ORDER BY created_at, id",
            FEED_COLUMNS
        ))?;

        let feeds = stmt.query_map([], feed_from_row)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn get_by_id(&self, id: i64) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let feed = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE id = ?1", FEED_COLUMNS),
                [id],
                feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let feed = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE url = ?1", FEED_COLUMNS),
                [url],
                feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn next_feed_due_for_refresh(&self) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let feed = conn
            .query_row(
                &format!(
                    "SELECT {} FROM feeds ORDER BY last_fetched_at ASC NULLS FIRST, id ASC LIMIT 1",
                    FEED_COLUMNS
                ),
                [],
                feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn mark_feed_refreshed(&self, feed_id: i64, at: DateTime<Utc>) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let updated = conn.execute(
            &format!("UPDATE feeds SET {} WHERE id = ?2", MARK_REFRESHED),
            (at, feed_id),
        )?;

        if updated == 0 {
            return Err(GatorError::FeedNotFound(feed_id.to_string()));
        }
        Ok(())
    }

    /// Select and mark in a single `UPDATE ... RETURNING`, so two schedulers
    /// sharing the database cannot both claim the same feed.
    fn claim_next_feed(&self, at: DateTime<Utc>) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let feed = conn
            .query_row(
                &format!(
                    "UPDATE feeds SET {}
                     WHERE id = (
                         SELECT id FROM feeds
                         ORDER BY last_fetched_at ASC NULLS FIRST, id ASC
                         LIMIT 1
                     )
                     RETURNING {}",
                    MARK_REFRESHED, FEED_COLUMNS
                ),
                [at],
                feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteUserRepository;
    use crate::storage::traits::UserRepository;
    use chrono::Duration;

    fn setup_repo() -> (SqliteFeedRepository, i64) {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = SqliteUserRepository::new(storage.clone()).create("ada").unwrap();
        (SqliteFeedRepository::new(storage), user.id)
    }

    #[test]
    fn test_add_and_get_feed() {
        let (repo, user_id) = setup_repo();
        let feed = repo
            .add("Example Feed", "https://example.com/feed.xml", user_id)
            .unwrap();

        assert!(feed.id > 0);
        assert!(feed.never_fetched());

        let retrieved = repo.get_by_id(feed.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Example Feed");
        assert_eq!(retrieved.user_id, user_id);

        let by_url = repo.get_by_url("https://example.com/feed.xml").unwrap();
        assert_eq!(by_url, Some(retrieved));
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let (repo, user_id) = setup_repo();
        repo.add("One", "https://example.com/feed.xml", user_id).unwrap();

        let result = repo.add("Two", "https://example.com/feed.xml", user_id);
        assert!(matches!(result, Err(GatorError::FeedAlreadyExists(_))));
    }

    #[test]
    fn test_never_fetched_feed_is_due_first() {
        let (repo, user_id) = setup_repo();
        let fetched = repo.add("F2", "https://example.com/2.xml", user_id).unwrap();
        let fresh = repo.add("F1", "https://example.com/1.xml", user_id).unwrap();

        repo.mark_feed_refreshed(fetched.id, Utc::now()).unwrap();

        let next = repo.next_feed_due_for_refresh().unwrap().unwrap();
        assert_eq!(next.id, fresh.id);
    }

    #[test]
    fn test_oldest_fetch_is_due_first() {
        let (repo, user_id) = setup_repo();
        let a = repo.add("A", "https://example.com/a.xml", user_id).unwrap();
        let b = repo.add("B", "https://example.com/b.xml", user_id).unwrap();
        let now = Utc::now();

        repo.mark_feed_refreshed(a.id, now).unwrap();
        repo.mark_feed_refreshed(b.id, now - Duration::hours(1)).unwrap();

        let next = repo.next_feed_due_for_refresh().unwrap().unwrap();
        assert_eq!(next.id, b.id);
    }

    #[test]
    fn test_no_feed_due_when_empty() {
        let (repo, _) = setup_repo();
        assert!(repo.next_feed_due_for_refresh().unwrap().is_none());
        assert!(repo.claim_next_feed(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_mark_refreshed_never_moves_backwards() {
        let (repo, user_id) = setup_repo();
        let feed = repo.add("A", "https://example.com/a.xml", user_id).unwrap();
        let now = Utc::now();

        repo.mark_feed_refreshed(feed.id, now).unwrap();
        repo.mark_feed_refreshed(feed.id, now - Duration::minutes(5)).unwrap();

        let stored = repo.get_by_id(feed.id).unwrap().unwrap();
        assert_eq!(stored.last_fetched_at, Some(now));
    }

    #[test]
    fn test_mark_refreshed_unknown_feed() {
        let (repo, _) = setup_repo();
        let result = repo.mark_feed_refreshed(42, Utc::now());
        assert!(matches!(result, Err(GatorError::FeedNotFound(_))));
    }

    #[test]
    fn test_claim_rotates_through_feeds() {
        let (repo, user_id) = setup_repo();
        let a = repo.add("A", "https://example.com/a.xml", user_id).unwrap();
        let b = repo.add("B", "https://example.com/b.xml", user_id).unwrap();
        let start = Utc::now();

        let first = repo.claim_next_feed(start).unwrap().unwrap();
        let second = repo
            .claim_next_feed(start + Duration::seconds(1))
            .unwrap()
            .unwrap();
        let third = repo
            .claim_next_feed(start + Duration::seconds(2))
            .unwrap()
            .unwrap();

        assert_eq!(first.id, a.id);
        assert_eq!(first.last_fetched_at, Some(start));
        assert_eq!(second.id, b.id);
        assert_eq!(third.id, a.id);
    }
}
