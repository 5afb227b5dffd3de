use std::fmt;

/// Days until expiry, or one of the sentinel values that stand in for a
/// number: "Expired" for past-due options, "N/A" for stock holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysLeft {
    Days(i64),
    Expired,
    NotApplicable,
}

impl fmt::Display for DaysLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysLeft::Days(n) => write!(f, "{n}"),
            DaysLeft::Expired => write!(f, "Expired"),
            DaysLeft::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// One CSV data row after normalization and validation. Never mutated after
/// creation; invalid records carry their error list and are excluded from
/// commit.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: String,
    pub symbol: String,
    pub strategy: String,
    pub trade_date: String,
    pub expiration_date: String,
    pub quantity: i64,
    /// None when the row had too few fields to carry the column at all.
    pub days_left: Option<DaysLeft>,
    pub credit_amount: f64,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SpreadPosition {
    pub symbol: String,
    pub strategy: String,
    pub strikes: String,
    pub trade_date: String,
    pub expiration_date: String,
    pub quantity: i64,
    pub days_left: DaysLeft,
    pub credit_amount: f64,
}

/// A position in the book. The explicit discriminant (rather than probing for
/// a `strikes` field) keeps handling exhaustive at every display site.
#[derive(Debug, Clone)]
pub enum Position {
    Spread(SpreadPosition),
    Imported(ImportRecord),
}

impl Position {
    pub fn symbol(&self) -> &str {
        match self {
            Position::Spread(p) => &p.symbol,
            Position::Imported(r) => &r.symbol,
        }
    }

    pub fn strategy(&self) -> &str {
        match self {
            Position::Spread(p) => &p.strategy,
            Position::Imported(r) => &r.strategy,
        }
    }

    pub fn strikes(&self) -> &str {
        match self {
            Position::Spread(p) => &p.strikes,
            Position::Imported(_) => "",
        }
    }

    pub fn trade_date(&self) -> &str {
        match self {
            Position::Spread(p) => &p.trade_date,
            Position::Imported(r) => &r.trade_date,
        }
    }

    pub fn expiration_date(&self) -> &str {
        match self {
            Position::Spread(p) => &p.expiration_date,
            Position::Imported(r) => &r.expiration_date,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            Position::Spread(p) => p.quantity,
            Position::Imported(r) => r.quantity,
        }
    }

    pub fn days_left(&self) -> Option<DaysLeft> {
        match self {
            Position::Spread(p) => Some(p.days_left),
            Position::Imported(r) => r.days_left,
        }
    }

    pub fn credit_amount(&self) -> f64 {
        match self {
            Position::Spread(p) => p.credit_amount,
            Position::Imported(r) => r.credit_amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub last_price: f64,
    pub change_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_left_display() {
        assert_eq!(DaysLeft::Days(25).to_string(), "25");
        assert_eq!(DaysLeft::Days(0).to_string(), "0");
        assert_eq!(DaysLeft::Expired.to_string(), "Expired");
        assert_eq!(DaysLeft::NotApplicable.to_string(), "N/A");
    }
}
