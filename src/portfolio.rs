use std::collections::BTreeMap;

use chrono::{Duration, Local};
use rand::Rng;

use crate::models::{DaysLeft, ImportRecord, Position, SpreadPosition, WatchlistEntry};

/// Sample spread, dated relative to today so the book always looks live.
struct SampleSpread {
    symbol: &'static str,
    strategy: &'static str,
    strikes: &'static str,
    days_held: i64,
    days_out: i64,
    quantity: i64,
    credit: f64,
}

const SAMPLE_SPREADS: &[SampleSpread] = &[
    SampleSpread { symbol: "SPY", strategy: "Iron Condor", strikes: "430/435/465/470", days_held: 12, days_out: 23, quantity: 5, credit: 612.50 },
    SampleSpread { symbol: "QQQ", strategy: "Bull Put Spread", strikes: "355/350", days_held: 8, days_out: 37, quantity: 10, credit: 980.00 },
    SampleSpread { symbol: "AAPL", strategy: "Iron Condor", strikes: "165/170/195/200", days_held: 25, days_out: 9, quantity: 3, credit: 288.00 },
    SampleSpread { symbol: "TSLA", strategy: "Strangle", strikes: "180/260", days_held: 5, days_out: 51, quantity: 2, credit: 1240.00 },
    SampleSpread { symbol: "NVDA", strategy: "Bear Call Spread", strikes: "520/530", days_held: 19, days_out: 16, quantity: 4, credit: 736.00 },
    SampleSpread { symbol: "IWM", strategy: "Iron Condor", strikes: "185/190/205/210", days_held: 33, days_out: 2, quantity: 6, credit: 450.00 },
    SampleSpread { symbol: "AMD", strategy: "Bull Put Spread", strikes: "140/135", days_held: 48, days_out: -6, quantity: 8, credit: 520.00 },
];

const SAMPLE_WATCHLIST: &[(&str, f64)] = &[
    ("SPY", 447.32),
    ("QQQ", 374.85),
    ("IWM", 196.40),
    ("AAPL", 182.19),
    ("TSLA", 214.66),
    ("NVDA", 487.02),
    ("AMD", 146.73),
    ("VIX", 14.82),
];

/// Per-strategy aggregates and headline numbers for the dashboard. Plain sums
/// over the current position list; nothing here prices anything.
#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub open_positions: usize,
    pub total_credit: f64,
    pub total_contracts: i64,
    pub expiring_soon: usize,
    pub expired: usize,
    /// (strategy, credit total) sorted by credit, largest first.
    pub strategy_credit: Vec<(String, f64)>,
}

/// The single owner of session state: the in-memory position list and the
/// mock watchlist. Mutated only through the methods below; lives for the
/// process lifetime and is never persisted.
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub watchlist: Vec<WatchlistEntry>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            watchlist: build_watchlist(),
        }
    }

    pub fn sample() -> Self {
        let today = Local::now().date_naive();
        let positions = SAMPLE_SPREADS
            .iter()
            .map(|s| {
                let days_left = if s.days_out < 0 {
                    DaysLeft::Expired
                } else {
                    DaysLeft::Days(s.days_out)
                };
                Position::Spread(SpreadPosition {
                    symbol: s.symbol.to_string(),
                    strategy: s.strategy.to_string(),
                    strikes: s.strikes.to_string(),
                    trade_date: (today - Duration::days(s.days_held))
                        .format("%Y-%m-%d")
                        .to_string(),
                    expiration_date: (today + Duration::days(s.days_out))
                        .format("%Y-%m-%d")
                        .to_string(),
                    quantity: s.quantity,
                    days_left,
                    credit_amount: s.credit,
                })
            })
            .collect();
        Self {
            positions,
            watchlist: build_watchlist(),
        }
    }

    /// Merge one committed import batch. The caller (the session controller)
    /// has already filtered to the valid subset; no dedup is attempted.
    pub fn commit_imported(&mut self, records: Vec<ImportRecord>) {
        self.positions
            .extend(records.into_iter().map(Position::Imported));
    }

    /// Re-jitter the mock quotes, simulating a day's movement.
    pub fn refresh_quotes(&mut self) {
        let mut rng = rand::thread_rng();
        for entry in &mut self.watchlist {
            let pct: f64 = rng.gen_range(-2.5..2.5);
            entry.change_pct = pct;
            entry.last_price *= 1.0 + pct / 100.0;
        }
    }

    pub fn summary(&self, expiring_soon_days: i64) -> PortfolioSummary {
        let mut total_credit = 0.0;
        let mut total_contracts = 0;
        let mut expiring_soon = 0;
        let mut expired = 0;
        let mut by_strategy: BTreeMap<String, f64> = BTreeMap::new();

        for pos in &self.positions {
            total_credit += pos.credit_amount();
            total_contracts += pos.quantity();
            match pos.days_left() {
                Some(DaysLeft::Days(n)) if n < 0 => expired += 1,
                Some(DaysLeft::Days(n)) if n <= expiring_soon_days => expiring_soon += 1,
                Some(DaysLeft::Expired) => expired += 1,
                _ => {}
            }
            *by_strategy.entry(pos.strategy().to_string()).or_default() +=
                pos.credit_amount();
        }

        let mut strategy_credit: Vec<(String, f64)> = by_strategy.into_iter().collect();
        strategy_credit.sort_by(|a, b| b.1.total_cmp(&a.1));

        PortfolioSummary {
            open_positions: self.positions.len(),
            total_credit,
            total_contracts,
            expiring_soon,
            expired,
            strategy_credit,
        }
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}

fn build_watchlist() -> Vec<WatchlistEntry> {
    SAMPLE_WATCHLIST
        .iter()
        .map(|(symbol, price)| WatchlistEntry {
            symbol: symbol.to_string(),
            last_price: *price,
            change_pct: 0.0,
        })
        .collect()
}
