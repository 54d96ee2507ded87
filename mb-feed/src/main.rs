//! mb-feed - Read the home feed or a profile's posts

use clap::Parser;
use libmicroblog::logging;
use libmicroblog::{MicroblogService, Page, Result, TimelineEntry};

#[derive(Parser, Debug)]
#[command(name = "mb-feed")]
#[command(version)]
#[command(about = "Read the home feed or a profile's posts")]
#[command(long_about = "\
mb-feed - Read the home feed or a profile's posts

The home feed holds your own posts and the posts of everyone you follow,
newest first. Pages hold [feed] posts_per_page entries (default 3).

USAGE EXAMPLES:
    # Your home feed, first page
    mb-feed --as john

    # Next page
    mb-feed --as john --page 2

    # Posts written by one account (no login needed)
    mb-feed --user susan

    # JSON for scripting
    mb-feed --as john --format json | jq -r '.items[].post.body'

EXIT CODES:
    0 - Success (including empty pages)
    1 - Database or configuration error
    2 - Not logged in (--as missing for the home feed)
    3 - Invalid page number
    4 - User not found
")]
struct Cli {
    /// Page to show, starting at 1
    #[arg(short, long, default_value = "1")]
    page: u32,

    /// Show posts written by this nickname instead of the home feed
    #[arg(short, long, value_name = "NICKNAME")]
    user: Option<String>,

    /// Nickname to act as
    #[arg(long = "as", env = "MICROBLOG_ACCOUNT", value_name = "NICKNAME")]
    as_account: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = MicroblogService::new().await?;

    let page = match &cli.user {
        Some(nickname) => {
            let account = service.accounts().find_by_nickname(nickname).await?;
            service.feed().user_posts(&account, cli.page).await?
        }
        None => {
            let viewer = service.accounts().viewer(cli.as_account.as_deref()).await?;
            service.feed().home_feed(&viewer, cli.page).await?
        }
    };

    if cli.format == "json" {
        let output = serde_json::to_string_pretty(&page)?;
        println!("{}", output);
    } else {
        print_page(&page);
    }

    if let Err(e) = service.flush_notifications().await {
        tracing::warn!("Failed to flush notifications: {}", e);
    }
    Ok(())
}

fn print_page(page: &Page<TimelineEntry>) {
    if page.items.is_empty() {
        println!("No posts.");
        return;
    }

    for entry in &page.items {
        let when = chrono::DateTime::from_timestamp(entry.post.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.post.created_at.to_string());
        println!("[{}] {}: {}", when, entry.author.nickname, entry.post.body);
    }

    match (page.prev_page(), page.next_page()) {
        (None, None) => {}
        (prev, next) => {
            let mut hints = Vec::new();
            if let Some(prev) = prev {
                hints.push(format!("newer: --page {}", prev));
            }
            if let Some(next) = next {
                hints.push(format!("older: --page {}", next));
            }
            eprintln!("Page {} ({})", page.page, hints.join(", "));
        }
    }
}
