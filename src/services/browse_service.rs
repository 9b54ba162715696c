use crate::domain::{PostView, User};
use crate::errors::{GatorError, GatorResult};
use crate::storage::traits::EntryRepository;

pub const DEFAULT_BROWSE_LIMIT: usize = 2;

pub struct BrowseService<E: EntryRepository> {
    entries: E,
}

impl<E: EntryRepository> BrowseService<E> {
    pub fn new(entries: E) -> Self {
        Self { entries }
    }

    /// Newest posts across the feeds `user` follows. Undated posts sort last.
    pub fn browse(&self, user: &User, limit: Option<usize>) -> GatorResult<Vec<PostView>> {
        let limit = limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
        if limit == 0 {
            return Err(GatorError::InvalidInput("limit must be at least 1".to_string()));
        }
        self.entries.posts_for_user(user.id, limit)
    }
}
