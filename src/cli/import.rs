use std::io::Write;
use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{CondorError, Result};
use crate::fmt::money;
use crate::portfolio::Portfolio;
use crate::session::ImportSession;
use crate::settings::{load_settings, shellexpand};

pub fn run(file: &str, yes: bool) -> Result<()> {
    let path_str = shellexpand(file);
    let mut session = ImportSession::new();
    if !session.offer_file(Path::new(&path_str)) {
        let msg = session
            .take_alert()
            .unwrap_or_else(|| "Import failed".to_string());
        return Err(CondorError::Other(msg));
    }

    if let Some(batch) = session.batch() {
        let mut table = Table::new();
        table.set_header(vec![
            "Row", "Symbol", "Strategy", "Trade Date", "Expiration", "Qty", "Days Left",
            "Credit", "Errors",
        ]);
        for (i, record) in batch.records.iter().enumerate() {
            let days = record
                .days_left
                .map(|d| d.to_string())
                .unwrap_or_default();
            let status = if record.is_valid {
                Cell::new("")
            } else {
                Cell::new(record.errors.join("; ").red().to_string())
            };
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&record.symbol),
                Cell::new(&record.strategy),
                Cell::new(&record.trade_date),
                Cell::new(&record.expiration_date),
                Cell::new(record.quantity),
                Cell::new(days),
                Cell::new(money(record.credit_amount)),
                status,
            ]);
        }
        println!("{table}");
    }

    let valid = session.valid_count();
    let invalid = session.invalid_count();
    let invalid_str = if invalid > 0 {
        format!("{invalid} invalid").red().to_string()
    } else {
        format!("{invalid} invalid")
    };
    println!(
        "{} / {} / {} total",
        format!("{valid} valid").green(),
        invalid_str,
        session.total_count()
    );

    if valid == 0 {
        println!("Nothing to import.");
        return Ok(());
    }

    if !yes && !confirm(&format!("Import {valid} valid position(s)? [y/N] ")) {
        println!("Aborted.");
        return Ok(());
    }

    let records = session
        .commit()
        .ok_or_else(|| CondorError::Other("Commit refused".to_string()))?;

    let settings = load_settings();
    let mut portfolio = if settings.load_sample_data {
        Portfolio::sample()
    } else {
        Portfolio::new()
    };
    portfolio.commit_imported(records);
    let summary = portfolio.summary(settings.expiring_soon_days);
    println!(
        "{} imported. Book now holds {} positions, {} credit collected.",
        session.committed(),
        summary.open_positions,
        money(summary.total_credit)
    );
    Ok(())
}

fn confirm(label: &str) -> bool {
    print!("{label}");
    let _ = std::io::stdout().flush();
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim(), "y" | "Y" | "yes")
}
