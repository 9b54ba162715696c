pub mod document;
pub mod entry;
pub mod feed;
pub mod user;

pub use document::{ParsedChannel, ParsedDocument, ParsedItem};
pub use entry::{CreateOutcome, Entry, NewEntry, PostView};
pub use feed::{Feed, FeedFollow};
pub use user::User;
