use chrono::Utc;

use crate::domain::{CreateOutcome, Entry, NewEntry, PostView};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::EntryRepository;

pub struct SqliteEntryRepository {
    storage: SqliteStorage,
}

impl SqliteEntryRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl EntryRepository for SqliteEntryRepository {
    fn create_entry(&self, entry: &NewEntry) -> GatorResult<CreateOutcome> {
        let conn = self.storage.connection()?;

        let inserted = conn.execute(
            "INSERT INTO posts (feed_id, title, description, url, published_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                entry.feed_id,
                &entry.title,
                &entry.description,
                &entry.url,
                entry.published_at,
                Utc::now(),
            ),
        );

        match inserted {
            Ok(_) => Ok(CreateOutcome::Created(conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(CreateOutcome::Duplicate),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn count_for_feed(&self, feed_id: i64) -> GatorResult<i64> {
        let conn = self.storage.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE feed_id = ?1",
            [feed_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn posts_for_user(&self, user_id: i64, limit: usize) -> GatorResult<Vec<PostView>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.feed_id, p.title, p.description, p.url, p.published_at, p.created_at,
                    f.name
             FROM posts p
             JOIN feeds f ON f.id = p.feed_id
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC, p.id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = stmt.query_map((user_id, limit), |row| {
            Ok(PostView {
                entry: Entry {
                    id: row.get(0)?,
                    feed_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    url: row.get(4)?,
                    published_at: row.get(5)?,
                    created_at: row.get(6)?,
                },
                feed_name: row.get(7)?,
            })
        })?;

        posts.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }
}
