//! mb-follow - Follow and unfollow accounts, list followers

use clap::{Parser, Subcommand};
use libmicroblog::logging;
use libmicroblog::{Account, MicroblogService, Result};

#[derive(Parser, Debug)]
#[command(name = "mb-follow")]
#[command(version)]
#[command(about = "Follow and unfollow accounts, list followers")]
#[command(long_about = "\
mb-follow - Follow and unfollow accounts, list followers

COMMANDS:
    follow      Follow an account (notifies them by email when mail is enabled)
    unfollow    Stop following an account
    followers   List the accounts following someone
    following   List the accounts someone follows

USAGE EXAMPLES:
    mb-follow --as john follow susan
    mb-follow --as john unfollow susan
    mb-follow followers susan
    mb-follow following john --format json | jq -r '.[].nickname'

Following someone you already follow, or unfollowing someone you do not
follow, changes nothing and is not an error.

EXIT CODES:
    0 - Success (including no-op follow/unfollow)
    1 - Database or configuration error
    2 - Not logged in (--as missing)
    4 - User not found
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Nickname to act as
    #[arg(long = "as", env = "MICROBLOG_ACCOUNT", global = true, value_name = "NICKNAME")]
    as_account: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text", global = true)]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow an account
    Follow { nickname: String },

    /// Stop following an account
    Unfollow { nickname: String },

    /// List accounts following NICKNAME
    Followers { nickname: String },

    /// List accounts NICKNAME follows
    Following { nickname: String },
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
    let result = execute(&service, cli).await;

    // Give queued follower mail a chance to go out before exiting
    if let Err(e) = service.flush_notifications().await {
        tracing::warn!("Failed to flush notifications: {}", e);
    }

    result
}

async fn execute(service: &MicroblogService, cli: Cli) -> Result<()> {
    let json = cli.format == "json";

    match cli.command {
        Commands::Follow { nickname } => {
            let viewer = service.accounts().viewer(cli.as_account.as_deref()).await?;
            let target = service.accounts().find_by_nickname(&nickname).await?;
            let changed = service.graph().follow(&viewer, &target).await?.is_some();

            if json {
                println!("{}", serde_json::json!({ "nickname": target.nickname, "changed": changed }));
            } else if changed {
                println!("You are now following {}!", target.nickname);
            } else {
                println!("You are already following {}.", target.nickname);
            }
        }

        Commands::Unfollow { nickname } => {
            let viewer = service.accounts().viewer(cli.as_account.as_deref()).await?;
            let target = service.accounts().find_by_nickname(&nickname).await?;
            let is_self = viewer.account()?.id == target.id;
            let changed = service.graph().unfollow(&viewer, &target).await?.is_some();

            if json {
                println!("{}", serde_json::json!({ "nickname": target.nickname, "changed": changed }));
            } else if changed {
                println!("You have stopped following {}.", target.nickname);
            } else if is_self {
                println!("You can't unfollow yourself!");
            } else {
                println!("You are not following {}.", target.nickname);
            }
        }

        Commands::Followers { nickname } => {
            let account = service.accounts().find_by_nickname(&nickname).await?;
            let followers = service.graph().followers(&account).await?;
            print_accounts(&followers, json);
        }

        Commands::Following { nickname } => {
            let account = service.accounts().find_by_nickname(&nickname).await?;
            let following = service.graph().following(&account).await?;
            print_accounts(&following, json);
        }
    }

    Ok(())
}

fn print_accounts(accounts: &[Account], json: bool) {
    if json {
        match serde_json::to_string_pretty(accounts) {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("Error: failed to serialize output: {}", e),
        }
        return;
    }

    for account in accounts {
        println!("{}", account.nickname);
    }
}
