pub mod traits;
pub mod sqlite;

pub use traits::{EntryRepository, FeedRepository, FollowRepository, UserRepository};
pub use sqlite::{
    SqliteEntryRepository, SqliteFeedRepository, SqliteFollowRepository, SqliteStorage,
    SqliteUserRepository,
};
