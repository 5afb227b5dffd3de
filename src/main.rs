mod cli;
mod error;
mod fmt;
mod importer;
mod models;
mod portfolio;
mod session;
mod settings;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Import { file, yes }) => cli::import::run(&file, yes),
        Some(Commands::Positions) => cli::positions::run(),
        Some(Commands::Watchlist) => cli::watchlist::run(),
        Some(Commands::Dashboard) | None => cli::dashboard::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
