mod connection;
mod entry_repository;
mod feed_repository;
mod follow_repository;
mod user_repository;

pub use connection::SqliteStorage;
pub use entry_repository::SqliteEntryRepository;
pub use feed_repository::SqliteFeedRepository;
pub use follow_repository::SqliteFollowRepository;
pub use user_repository::SqliteUserRepository;

pub(crate) use connection::is_unique_violation;
