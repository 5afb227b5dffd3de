pub mod dashboard;
pub mod import;
pub mod import_manager;
pub mod positions;
pub mod watchlist;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "condor",
    about = "Terminal dashboard for options positions with CSV trade import."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import positions from a CSV file (preview, then commit valid rows).
    Import {
        /// Path to the CSV file
        file: String,
        /// Commit valid rows without asking
        #[arg(long)]
        yes: bool,
    },
    /// List the positions in the book.
    Positions,
    /// Show the watchlist with mock quotes.
    Watchlist,
    /// Open the interactive dashboard (the default when no command is given).
    Dashboard,
}
