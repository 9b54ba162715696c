use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gator::cli::{parse_interval, Cli, Commands};
use gator::config::Config;
use gator::domain::User;
use gator::errors::GatorResult;
use gator::fetcher::HttpFetcher;
use gator::services::{BrowseService, FeedService, PollOutcome, PollService, UserService};
use gator::storage::sqlite::{
    SqliteEntryRepository, SqliteFeedRepository, SqliteFollowRepository, SqliteStorage,
    SqliteUserRepository,
};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Reject a bad interval before touching the store.
    let interval = match &cli.command {
        Commands::Agg {
            interval: Some(raw),
        } => Some(parse_interval(raw)?),
        _ => None,
    };

    let config = Config::from_env()?;
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path))?;

    let users = UserService::new(SqliteUserRepository::new(storage.clone()));
    let feeds = FeedService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqliteFollowRepository::new(storage.clone()),
        SqliteUserRepository::new(storage.clone()),
    );
    let current = || users.resolve_current(cli.user.as_deref());

    match &cli.command {
        Commands::Register { name } => {
            let user = users.register(name)?;
            println!("User created: {}", user.name);
        }
        Commands::Login { name } => {
            let user = users.login(name)?;
            println!("Logged in as {}", user.name);
        }
        Commands::Users => cmd_users(&users)?,
        Commands::Reset => {
            let deleted = users.reset()?;
            println!("Reset complete: {} users deleted", deleted);
        }
        Commands::Addfeed { name, url } => {
            let user = current()?;
            let (feed, _) = feeds.add(&user, name, url)?;
            println!("Feed added: {} ({})", feed.name, feed.url);
            println!("{} is now following {}", user.name, feed.name);
        }
        Commands::Feeds => cmd_feeds(&feeds)?,
        Commands::Follow { url } => {
            let follow = feeds.follow(&current()?, url)?;
            println!("{} is now following {}", follow.user_name, follow.feed_name);
        }
        Commands::Unfollow { url } => {
            let user = current()?;
            feeds.unfollow(&user, url)?;
            println!("{} unfollowed {}", user.name, url);
        }
        Commands::Following => cmd_following(&feeds, &current()?)?,
        Commands::Browse { limit } => {
            let browse = BrowseService::new(SqliteEntryRepository::new(storage.clone()));
            cmd_browse(&browse, &current()?, *limit)?;
        }
        Commands::Agg { .. } => {
            let fetcher =
                HttpFetcher::from_config(&config).context("building HTTP client")?;
            let poller = PollService::new(
                SqliteFeedRepository::new(storage.clone()),
                SqliteEntryRepository::new(storage),
                fetcher,
            );
            cmd_agg(&poller, interval)?;
        }
    }

    Ok(())
}

fn cmd_users(users: &UserService<SqliteUserRepository>) -> GatorResult<()> {
    for (user, is_current) in users.list()? {
        if is_current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

fn cmd_feeds(
    feeds: &FeedService<SqliteFeedRepository, SqliteFollowRepository, SqliteUserRepository>,
) -> GatorResult<()> {
    let listings = feeds.list()?;
    if listings.is_empty() {
        println!("No feeds found.");
        return Ok(());
    }

    for listing in listings {
        println!("* {}", listing.feed.name);
        println!("  URL: {}", listing.feed.url);
        println!(
            "  Added by: {}",
            listing.owner.as_deref().unwrap_or("(unknown)")
        );
        match listing.feed.last_fetched_at {
            Some(at) => println!("  Last fetched: {}", at.to_rfc3339()),
            None => println!("  Last fetched: never"),
        }
    }
    Ok(())
}

fn cmd_following(
    feeds: &FeedService<SqliteFeedRepository, SqliteFollowRepository, SqliteUserRepository>,
    user: &User,
) -> GatorResult<()> {
    let follows = feeds.following(user)?;
    if follows.is_empty() {
        println!("{} is not following any feeds.", user.name);
        return Ok(());
    }

    println!("{} is following:", user.name);
    for follow in follows {
        println!("* {}", follow.feed_name);
    }
    Ok(())
}

fn cmd_browse(
    browse: &BrowseService<SqliteEntryRepository>,
    user: &User,
    limit: Option<usize>,
) -> GatorResult<()> {
    let posts = browse.browse(user, limit)?;
    if posts.is_empty() {
        println!("No posts yet. Run `gator agg` to collect some.");
        return Ok(());
    }

    for post in posts {
        let published = post
            .entry
            .published_at
            .map(|at| at.format("%a %b %e %Y").to_string())
            .unwrap_or_else(|| "undated".to_string());
        println!("{} from {}", published, post.feed_name);
        println!("--- {} ---", post.entry.title);
        if !post.entry.description.is_empty() {
            println!("    {}", post.entry.description);
        }
        println!("Link: {}", post.entry.url);
        println!("=====================================");
    }
    Ok(())
}

fn cmd_agg(
    poller: &PollService<SqliteFeedRepository, SqliteEntryRepository, HttpFetcher>,
    interval: Option<std::time::Duration>,
) -> GatorResult<()> {
    match interval {
        Some(interval) => poller.poll_forever(interval),
        None => match poller.poll_once()? {
            PollOutcome::Idle => {
                println!("No feeds to fetch.");
                Ok(())
            }
            PollOutcome::Polled { feed, report } => {
                println!(
                    "{}: {} new, {} already stored, {} failed",
                    feed.name,
                    report.created,
                    report.skipped,
                    report.errors.len()
                );
                Ok(())
            }
        },
    }
}
