//! MKM CLI - Booking submission and show-schedule maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Submit a booking request from the terminal
//! mkm-cli book -n "Jo Lee" -e jo@example.com -t "Pizza Records" \
//!     -m "We'd like a DJ set for our anniversary party please"
//!
//! # Normalize sort dates and prune old entries in the shows file
//! mkm-cli shows maintain --file src/shows.json
//!
//! # Preview without writing
//! mkm-cli shows maintain --file src/shows.json --dry
//! ```
//!
//! # Commands
//!
//! - `book` - Submit a booking request through the intake endpoint
//! - `shows maintain` - Ensure every show has a valid sort date, then
//!   prune past shows beyond the newest N

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mkm-cli")]
#[command(author, version, about = "MKM Entertainment CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a booking request
    Book(commands::book::BookArgs),
    /// Maintain the show-schedule data file
    Shows {
        #[command(subcommand)]
        action: ShowsAction,
    },
}

#[derive(Subcommand)]
enum ShowsAction {
    /// Normalize sort dates and prune past shows
    Maintain(commands::shows::MaintainArgs),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Book(args) => commands::book::submit(args).await?,
        Commands::Shows { action } => match action {
            ShowsAction::Maintain(args) => commands::shows::maintain(&args)?,
        },
    }
    Ok(())
}
