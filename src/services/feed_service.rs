use crate::domain::{Feed, FeedFollow, User};
use crate::errors::{GatorError, GatorResult};
use crate::fetcher::http::validate_url;
use crate::storage::traits::{FeedRepository, FollowRepository, UserRepository};

/// A feed together with the name of the user who added it.
#[derive(Debug, Clone)]
pub struct FeedListing {
    pub feed: Feed,
    pub owner: Option<String>,
}

pub struct FeedService<F: FeedRepository, W: FollowRepository, U: UserRepository> {
    feeds: F,
    follows: W,
    users: U,
}

impl<F, W, U> FeedService<F, W, U>
where
    F: FeedRepository,
    W: FollowRepository,
    U: UserRepository,
{
    pub fn new(feeds: F, follows: W, users: U) -> Self {
        Self {
            feeds,
            follows,
            users,
        }
    }

    /// Add a new feed owned by `user` and follow it.
    pub fn add(&self, user: &User, name: &str, url: &str) -> GatorResult<(Feed, FeedFollow)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatorError::InvalidInput("feed name cannot be empty".to_string()));
        }
        // Stored as typed so `follow`/`unfollow` match on the same text.
        let url = url.trim();
        validate_url(url).map_err(|_| GatorError::InvalidUrl(url.to_string()))?;

        let feed = self.feeds.add(name, url, user.id)?;
        let follow = self.follows.follow(user.id, feed.id)?;
        tracing::info!(feed_id = feed.id, user_id = user.id, url = %feed.url, "Added feed");

        Ok((feed, follow))
    }

    /// All feeds, oldest first, with their owner's name.
    pub fn list(&self) -> GatorResult<Vec<FeedListing>> {
        let owners: Vec<User> = self.users.get_all()?;

        Ok(self
            .feeds
            .get_all()?
            .into_iter()
            .map(|feed| {
                let owner = owners
                    .iter()
                    .find(|u| u.id == feed.user_id)
                    .map(|u| u.name.clone());
                FeedListing { feed, owner }
            })
            .collect())
    }

    /// Follow an existing feed by its URL.
    pub fn follow(&self, user: &User, url: &str) -> GatorResult<FeedFollow> {
        let feed = self
            .feeds
            .get_by_url(url.trim())?
            .ok_or_else(|| GatorError::FeedNotFound(url.to_string()))?;

        self.follows
            .follow(user.id, feed.id)
            .map_err(|e| match e {
                GatorError::AlreadyFollowing(_) => GatorError::AlreadyFollowing(feed.url.clone()),
                other => other,
            })
    }

    pub fn unfollow(&self, user: &User, url: &str) -> GatorResult<()> {
        if self.follows.unfollow(user.id, url.trim())? {
            Ok(())
        } else {
            Err(GatorError::NotFollowing(url.to_string()))
        }
    }

    pub fn following(&self, user: &User) -> GatorResult<Vec<FeedFollow>> {
        self.follows.following(user.id)
    }
}
