use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::portfolio::Portfolio;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let portfolio = if settings.load_sample_data {
        Portfolio::sample()
    } else {
        Portfolio::new()
    };

    if portfolio.positions.is_empty() {
        println!("No positions in the book. Import some with: condor import <file.csv>");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Symbol", "Strategy", "Strikes", "Trade Date", "Expiration", "Qty", "Days Left",
        "Credit",
    ]);
    for pos in &portfolio.positions {
        let days = pos
            .days_left()
            .map(|d| d.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(pos.symbol()),
            Cell::new(pos.strategy()),
            Cell::new(pos.strikes()),
            Cell::new(pos.trade_date()),
            Cell::new(pos.expiration_date()),
            Cell::new(pos.quantity()),
            Cell::new(days),
            Cell::new(money(pos.credit_amount())),
        ]);
    }
    println!("{table}");

    let summary = portfolio.summary(settings.expiring_soon_days);
    println!(
        "{} positions, {} credit collected, {} expiring within {} days",
        summary.open_positions,
        money(summary.total_credit),
        summary.expiring_soon,
        settings.expiring_soon_days
    );
    Ok(())
}
