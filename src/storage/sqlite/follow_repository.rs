use chrono::Utc;
use rusqlite::Row;

use crate::domain::FeedFollow;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::FollowRepository;

pub struct SqliteFollowRepository {
    storage: SqliteStorage,
}

impl SqliteFollowRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

const FOLLOW_SELECT: &str = "SELECT ff.id, ff.user_id, ff.feed_id, u.name, f.name, ff.created_at
    FROM feed_follows ff
    JOIN users u ON u.id = ff.user_id
    JOIN feeds f ON f.id = ff.feed_id";

fn follow_from_row(row: &Row<'_>) -> rusqlite::Result<FeedFollow> {
    Ok(FeedFollow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        feed_id: row.get(2)?,
        user_name: row.get(3)?,
        feed_name: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl FollowRepository for SqliteFollowRepository {
    fn follow(&self, user_id: i64, feed_id: i64) -> GatorResult<FeedFollow> {
        let conn = self.storage.connection()?;

        conn.execute(
            "INSERT INTO feed_follows (user_id, feed_id, created_at) VALUES (?1, ?2, ?3)",
            (user_id, feed_id, Utc::now()),
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::AlreadyFollowing(feed_id.to_string())
            } else {
                GatorError::from(e)
            }
        })?;

        let id = conn.last_insert_rowid();
        let follow = conn.query_row(
            &format!("{} WHERE ff.id = ?1", FOLLOW_SELECT),
            [id],
            follow_from_row,
        )?;
        Ok(follow)
    }

    fn unfollow(&self, user_id: i64, feed_url: &str) -> GatorResult<bool> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute(
            "DELETE FROM feed_follows
             WHERE user_id = ?1 AND feed_id = (SELECT id FROM feeds WHERE url = ?2)",
            (user_id, feed_url),
        )?;
        Ok(deleted > 0)
    }

    fn following(&self, user_id: i64) -> GatorResult<Vec<FeedFollow>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE ff.user_id = ?1 ORDER BY f.name",
            FOLLOW_SELECT
        ))?;
        let follows = stmt.query_map([user_id], follow_from_row)?;
        follows.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }
}
