//! mb-post - Publish a post
//!
//! Reads the body from the command line, or from stdin when none is given.

use clap::Parser;
use libmicroblog::logging;
use libmicroblog::{MicroblogError, MicroblogService, Result};
use std::io::{IsTerminal, Read};

#[derive(Parser, Debug)]
#[command(name = "mb-post")]
#[command(version)]
#[command(about = "Publish a post")]
#[command(long_about = "\
mb-post - Publish a post

Posts are 1 to 200 characters after trimming surrounding whitespace.
On success the new post id is printed to stdout.

USAGE EXAMPLES:
    mb-post --as john \"Beautiful day in Portland!\"
    echo \"Hello from a pipe\" | mb-post --as john
    mb-post --as john --format json \"Hi\" | jq .id

EXIT CODES:
    0 - Success
    1 - Database or configuration error
    2 - Not logged in (--as missing)
    3 - Invalid input (empty or too long)
    4 - User not found
")]
struct Cli {
    /// Post body (reads from stdin if not provided)
    body: Option<String>,

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
    let body = match cli.body {
        Some(body) => body,
        None => read_stdin()?,
    };

    let service = MicroblogService::new().await?;
    let viewer = service.accounts().viewer(cli.as_account.as_deref()).await?;
    let post = service.posting().publish(&viewer, &body).await?;

    if cli.format == "json" {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        println!("{}", post.id);
    }

    if let Err(e) = service.flush_notifications().await {
        tracing::warn!("Failed to flush notifications: {}", e);
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(MicroblogError::InvalidInput(
            "No post body given. Pass it as an argument or pipe it on stdin.".to_string(),
        ));
    }

    let mut body = String::new();
    stdin.read_to_string(&mut body).map_err(|e| {
        MicroblogError::InvalidInput(format!("Failed to read stdin: {}", e))
    })?;
    Ok(body)
}
