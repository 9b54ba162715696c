use thiserror::Error;

use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum GatorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("No user logged in; run `gator login <name>` or pass --user")]
    NotLoggedIn,

    // User errors
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    // Feed errors
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedAlreadyExists(String),

    #[error("Already following: {0}")]
    AlreadyFollowing(String),

    #[error("Not following: {0}")]
    NotFollowing(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // Network and parsing errors
    #[error("Couldn't fetch feed: {0}")]
    Fetch(#[from] FetchError),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database error: connection lock poisoned")]
    LockPoisoned,

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GatorError {
    /// Errors that must stop the process before any work is attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatorError::Config(_) | GatorError::InvalidDuration(_) | GatorError::NotLoggedIn
        )
    }
}

pub type GatorResult<T> = Result<T, GatorError>;
