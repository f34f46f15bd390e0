//! Pantry Shifts CLI - Terminal calendar and lookup tools.
//!
//! # Usage
//!
//! ```bash
//! # Who am I, and which tabs would the dashboard show?
//! pantry-cli --user-id 7 me
//!
//! # Pantries visible to everyone
//! pantry-cli pantries
//!
//! # Print one week of a pantry's shifts
//! pantry-cli --user-id 7 week --pantry 2 --date 2026-10-21
//!
//! # Browse weeks interactively (p/n/t/q)
//! pantry-cli --user-id 7 calendar --pantry 2
//!
//! # Capacity status of a role
//! pantry-cli capacity --required 10 --filled 8
//! ```
//!
//! # Environment Variables
//!
//! - `PANTRY_API_URL` - Backend base URL when `--api-url` is not given
//! - `PANTRY_USER_ID` - Identity when `--user-id` is not given
//! - `PANTRY_UTC_OFFSET` - Calendar offset when `--utc-offset` is not given

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pantry_shifts_core::{PantryId, UserId};

mod commands;

use commands::{CliError, Session};

#[derive(Parser)]
#[command(name = "pantry-cli")]
#[command(author, version, about = "Pantry Shifts CLI tools")]
struct Cli {
    /// Backend base URL, e.g. `http://127.0.0.1:5000`
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Act as this user (sent as `?user_id=`)
    #[arg(long, global = true)]
    user_id: Option<UserId>,

    /// Offset used to place shifts on calendar days, e.g. `-05:00`
    #[arg(long, global = true)]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current user, their roles and visible tabs
    Me,
    /// List every pantry
    Pantries,
    /// Print one week of shifts for a pantry
    Week {
        /// Pantry to show (defaults to the first pantry)
        #[arg(short, long)]
        pantry: Option<PantryId>,

        /// Any date in the week, `YYYY-MM-DD` (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Browse a pantry's calendar week by week
    Calendar {
        /// Pantry to show (defaults to the first pantry)
        #[arg(short, long)]
        pantry: Option<PantryId>,

        /// Starting date, `YYYY-MM-DD` (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Classify a role's headcount as full, almost full or available
    Capacity {
        /// Volunteers required
        #[arg(short, long)]
        required: u32,

        /// Volunteers signed up
        #[arg(short, long)]
        filled: u32,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantry_shifts_cli=warn,pantry_shifts_client=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Capacity { required, filled } = cli.command {
        return commands::capacity::show(required, filled);
    }

    let session = Session::connect(
        cli.api_url.as_deref(),
        cli.user_id,
        cli.utc_offset.as_deref(),
    )?;

    match cli.command {
        Commands::Me => commands::lookup::me(&session).await,
        Commands::Pantries => commands::lookup::pantries(&session).await,
        Commands::Week { pantry, date } => commands::calendar::week(&session, pantry, date).await,
        Commands::Calendar { pantry, date } => {
            commands::calendar::interactive(&session, pantry, date).await
        }
        Commands::Capacity { .. } => Ok(()),
    }
}
