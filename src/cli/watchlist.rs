use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::signed_pct;
use crate::portfolio::Portfolio;

pub fn run() -> Result<()> {
    let mut portfolio = Portfolio::new();
    portfolio.refresh_quotes();

    let mut table = Table::new();
    table.set_header(vec!["Symbol", "Last", "Change"]);
    for entry in &portfolio.watchlist {
        let change = if entry.change_pct < 0.0 {
            signed_pct(entry.change_pct).red().to_string()
        } else {
            signed_pct(entry.change_pct).green().to_string()
        };
        table.add_row(vec![
            Cell::new(&entry.symbol),
            Cell::new(format!("{:.2}", entry.last_price)),
            Cell::new(change),
        ]);
    }
    println!("{table}");
    println!("Quotes are mock values; no market data is fetched.");
    Ok(())
}
