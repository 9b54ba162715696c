pub mod browse_service;
pub mod feed_service;
pub mod ingest_service;
pub mod poll_service;
pub mod ticker;
pub mod user_service;

pub use browse_service::BrowseService;
pub use feed_service::{FeedListing, FeedService};
pub use ingest_service::{IngestReport, IngestService};
pub use poll_service::{PollOutcome, PollService};
pub use ticker::Ticker;
pub use user_service::UserService;
