use chrono::{DateTime, Utc};

use crate::domain::{CreateOutcome, Feed, FeedFollow, NewEntry, PostView, User};
use crate::errors::GatorResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    fn add(&self, name: &str, url: &str, user_id: i64) -> GatorResult<Feed>;
    fn get_all(&self) -> GatorResult<Vec<Feed>>;
    fn get_by_id(&self, id: i64) -> GatorResult<Option<Feed>>;
    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>>;

    /// The feed with the oldest `last_fetched_at`, never-fetched feeds first.
    fn next_feed_due_for_refresh(&self) -> GatorResult<Option<Feed>>;

    /// Record a fetch attempt. Never moves `last_fetched_at` backwards.
    fn mark_feed_refreshed(&self, feed_id: i64, at: DateTime<Utc>) -> GatorResult<()>;

    /// Select the next due feed and mark it in one step.
    ///
    /// Stores that can do this as a single conditional update should
    /// override the default, which leaves a window between the two calls.
    fn claim_next_feed(&self, at: DateTime<Utc>) -> GatorResult<Option<Feed>> {
        let Some(feed) = self.next_feed_due_for_refresh()? else {
            return Ok(None);
        };
        self.mark_feed_refreshed(feed.id, at)?;
        Ok(self.get_by_id(feed.id)?.or(Some(feed)))
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait EntryRepository: Send + Sync {
    /// Insert an entry keyed by `(feed_id, url)`.
    fn create_entry(&self, entry: &NewEntry) -> GatorResult<CreateOutcome>;
    fn count_for_feed(&self, feed_id: i64) -> GatorResult<i64>;
    fn posts_for_user(&self, user_id: i64, limit: usize) -> GatorResult<Vec<PostView>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create(&self, name: &str) -> GatorResult<User>;
    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>>;
    fn get_by_id(&self, id: i64) -> GatorResult<Option<User>>;
    fn get_all(&self) -> GatorResult<Vec<User>>;
    fn delete_all(&self) -> GatorResult<usize>;

    /// Name recorded by the last `register`/`login`.
    fn session_user(&self) -> GatorResult<Option<String>>;
    fn set_session_user(&self, name: &str) -> GatorResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FollowRepository: Send + Sync {
    fn follow(&self, user_id: i64, feed_id: i64) -> GatorResult<FeedFollow>;
    fn unfollow(&self, user_id: i64, feed_url: &str) -> GatorResult<bool>;
    fn following(&self, user_id: i64) -> GatorResult<Vec<FeedFollow>>;
}
