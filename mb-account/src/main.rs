//! mb-account - Log in, view and edit microblog profiles

use clap::{Parser, Subcommand};
use libmicroblog::logging;
use libmicroblog::{Account, FollowCounts, MicroblogService, Result};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "mb-account")]
#[command(version)]
#[command(about = "Log in, view and edit microblog profiles")]
#[command(long_about = "\
mb-account - Log in, view and edit microblog profiles

COMMANDS:
    login   Resolve a verified email to an account, creating it on first login
    show    Show a profile with avatar and follower counts
    edit    Change your nickname and about-me text

USAGE EXAMPLES:
    # First login creates the account (nickname from the email if omitted)
    mb-account login --email john@example.com --nickname john

    # Show a profile
    mb-account show susan
    mb-account show susan --format json | jq .avatar

    # Edit your own profile
    mb-account --as john edit --nickname johnny --about-me \"Rust and coffee\"

CONFIGURATION:
    Configuration file: ~/.config/microblog/config.toml

    Override with environment variables:
        MICROBLOG_CONFIG    - Path to config file
        MICROBLOG_DB_PATH   - Path to database file
        MICROBLOG_ACCOUNT   - Nickname to act as (same as --as)

EXIT CODES:
    0 - Success
    1 - Database or configuration error
    2 - Not logged in (--as missing)
    3 - Invalid input or nickname already in use
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
    /// Log in with a verified email address
    Login {
        /// Email address of the identity
        #[arg(long)]
        email: String,

        /// Preferred nickname for a new account
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Show a profile
    Show {
        /// Nickname of the profile
        nickname: String,
    },

    /// Edit your own profile
    Edit {
        /// New nickname (repeat the current one to keep it)
        #[arg(long)]
        nickname: String,

        /// New about-me text; omit to clear it
        #[arg(long)]
        about_me: Option<String>,
    },
}

/// Profile as printed by `show`
#[derive(Debug, Serialize)]
struct Profile {
    #[serde(flatten)]
    account: Account,
    avatar: String,
    #[serde(flatten)]
    counts: FollowCounts,
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

    if let Err(e) = service.flush_notifications().await {
        tracing::warn!("Failed to flush notifications: {}", e);
    }

    result
}

async fn execute(service: &MicroblogService, cli: Cli) -> Result<()> {
    let json = cli.format == "json";

    match cli.command {
        Commands::Login { email, nickname } => {
            let outcome = service.accounts().login(&email, nickname.as_deref()).await?;
            if json {
                print_json(&outcome);
            } else if outcome.created {
                println!("Welcome, {}! Your account has been created.", outcome.account.nickname);
            } else {
                println!("Logged in as {}.", outcome.account.nickname);
            }
        }

        Commands::Show { nickname } => {
            let account = service.accounts().find_by_nickname(&nickname).await?;
            let counts = service.graph().follow_counts(&account).await?;
            let profile = Profile {
                avatar: account.avatar(128),
                account,
                counts,
            };

            if json {
                print_json(&profile);
            } else {
                print_profile(&profile);
            }
        }

        Commands::Edit { nickname, about_me } => {
            let viewer = service.accounts().viewer(cli.as_account.as_deref()).await?;
            let account = service
                .accounts()
                .edit_profile(&viewer, &nickname, about_me.as_deref())
                .await?;

            if json {
                print_json(&account);
            } else {
                println!("Your changes have been saved.");
            }
        }
    }

    Ok(())
}

fn print_profile(profile: &Profile) {
    let account = &profile.account;
    println!("User: {}", account.nickname);
    println!("Avatar: {}", profile.avatar);
    if let Some(about_me) = &account.about_me {
        println!("About: {}", about_me);
    }
    if let Some(last_seen) = account.last_seen.and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)) {
        println!("Last seen: {}", last_seen.format("%Y-%m-%d %H:%M UTC"));
    }
    println!(
        "Followers: {} | Following: {}",
        profile.counts.followers, profile.counts.following
    );
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }
}
