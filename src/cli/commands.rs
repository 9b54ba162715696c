use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gator")]
#[command(about = "RSS feed aggregator: follow feeds, collect posts, browse them")]
#[command(version)]
pub struct Cli {
    /// Run as this user instead of the one recorded by `login`
    #[arg(long, global = true, env = "GATOR_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a user and log in as it
    Register {
        name: String,
    },

    /// Log in as an existing user
    Login {
        name: String,
    },

    /// List all users
    Users,

    /// Delete all users, feeds and posts
    Reset,

    /// Add a feed and follow it
    Addfeed {
        /// Display name for the feed
        name: String,
        /// Feed URL (http or https)
        url: String,
    },

    /// List all feeds
    Feeds,

    /// Follow an existing feed
    Follow {
        url: String,
    },

    /// Stop following a feed
    Unfollow {
        url: String,
    },

    /// List the feeds you follow
    Following,

    /// Show the newest posts from the feeds you follow
    Browse {
        /// Number of posts to show (default 2)
        limit: Option<usize>,
    },

    /// Collect posts from feeds, oldest-fetched first
    Agg {
        /// Time between requests, e.g. 30s, 1m, 1h30m. Runs a single cycle if omitted
        #[arg(value_name = "DURATION")]
        interval: Option<String>,
    },
}
