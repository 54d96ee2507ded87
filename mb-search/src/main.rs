//! mb-search - Keyword search over posts

use clap::Parser;
use libmicroblog::logging;
use libmicroblog::{MicroblogService, Result};

#[derive(Parser, Debug)]
#[command(name = "mb-search")]
#[command(version)]
#[command(about = "Search posts by keyword")]
#[command(long_about = "\
mb-search - Search posts by keyword

Every word of the query must appear in a post for it to match. Results are
ranked by relevance and capped by [search] max_results (default 50).

USAGE EXAMPLES:
    mb-search portland
    mb-search \"rust async\"
    mb-search rust --format json | jq -r '.[].author.nickname' | sort -u

EXIT CODES:
    0 - Success (including no matches)
    1 - Database or configuration error
")]
struct Cli {
    /// Words to search for
    query: String,

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
    let results = service.search().search(&cli.query).await?;

    if cli.format == "json" {
        let output = serde_json::to_string_pretty(&results)?;
        println!("{}", output);
    } else {
        for entry in &results {
            let when = chrono::DateTime::from_timestamp(entry.post.created_at, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| entry.post.created_at.to_string());
            println!("[{}] {}: {}", when, entry.author.nickname, entry.post.body);
        }
    }

    if let Err(e) = service.flush_notifications().await {
        tracing::warn!("Failed to flush notifications: {}", e);
    }
    Ok(())
}
