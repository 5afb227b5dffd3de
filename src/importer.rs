use crate::error::{CondorError, Result};
use crate::models::{DaysLeft, ImportRecord};

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// The logical columns a CSV header must provide, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalKey {
    Symbol,
    Strategy,
    TradeDate,
    ExpirationDate,
    Quantity,
    DaysLeft,
    CreditAmount,
}

impl CanonicalKey {
    pub const ALL: [CanonicalKey; 7] = [
        CanonicalKey::Symbol,
        CanonicalKey::Strategy,
        CanonicalKey::TradeDate,
        CanonicalKey::ExpirationDate,
        CanonicalKey::Quantity,
        CanonicalKey::DaysLeft,
        CanonicalKey::CreditAmount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalKey::Symbol => "symbol",
            CanonicalKey::Strategy => "strategy",
            CanonicalKey::TradeDate => "trade_date",
            CanonicalKey::ExpirationDate => "expiration_date",
            CanonicalKey::Quantity => "quantity",
            CanonicalKey::DaysLeft => "days_left",
            CanonicalKey::CreditAmount => "credit_amount",
        }
    }
}

/// Lower-case a raw header label and collapse runs of whitespace to a single
/// underscore, so "Days left", "days_left" and "DAYS  LEFT" all match.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Maps each canonical key to its column index in the input header row.
/// Column order in the file is free; every key must appear somewhere.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    indices: [usize; 7],
}

impl HeaderMap {
    pub fn from_row(fields: &[String]) -> Result<HeaderMap> {
        let mut indices = [None; 7];
        for (col, field) in fields.iter().enumerate() {
            let norm = normalize_header(field);
            for (slot, key) in CanonicalKey::ALL.iter().enumerate() {
                if norm == key.name() {
                    indices[slot] = Some(col);
                }
            }
        }

        let missing: Vec<&str> = CanonicalKey::ALL
            .iter()
            .enumerate()
            .filter(|(slot, _)| indices[*slot].is_none())
            .map(|(_, key)| key.name())
            .collect();
        if !missing.is_empty() {
            return Err(CondorError::InvalidCsv(format!(
                "CSV is missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(HeaderMap {
            indices: indices.map(|i| i.unwrap_or(0)),
        })
    }

    /// The field for `key`, or None when the data row is too short to have it.
    fn field<'a>(&self, row: &'a [String], key: CanonicalKey) -> Option<&'a str> {
        let slot = CanonicalKey::ALL.iter().position(|k| *k == key)?;
        row.get(self.indices[slot]).map(|s| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// Line tokenizer
// ---------------------------------------------------------------------------

/// Split one line into fields. A double quote toggles the in-quotes flag and
/// is dropped; two consecutive quotes are NOT an escaped literal quote (known
/// simplification). Commas outside quotes delimit; every field is trimmed.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

// ---------------------------------------------------------------------------
// Row validator
// ---------------------------------------------------------------------------

/// Strip currency decoration ($ and thousands commas) and parse. Parse
/// failure coerces to 0, matching the quantity/days-left coercions: the
/// value then fails the relevant presence rule instead of raising a
/// separate parse error.
pub fn parse_money(raw: &str) -> f64 {
    raw.replace(['$', ','], "").trim().parse().unwrap_or(0.0)
}

fn parse_count(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// Validate one tokenized data row into an ImportRecord. `index` is the
/// 0-based position among data rows and feeds the batch-unique id. All rules
/// run; all failures are collected in order.
pub fn validate_row(index: usize, fields: &[String], header: &HeaderMap) -> ImportRecord {
    let symbol = header
        .field(fields, CanonicalKey::Symbol)
        .unwrap_or("")
        .trim()
        .to_string();
    let strategy = header
        .field(fields, CanonicalKey::Strategy)
        .unwrap_or("")
        .trim()
        .to_string();
    let trade_date = header
        .field(fields, CanonicalKey::TradeDate)
        .unwrap_or("")
        .trim()
        .to_string();
    let expiration_raw = header
        .field(fields, CanonicalKey::ExpirationDate)
        .unwrap_or("")
        .trim()
        .to_string();

    let is_stock = strategy.eq_ignore_ascii_case("stock");

    let quantity = header
        .field(fields, CanonicalKey::Quantity)
        .map(parse_count)
        .unwrap_or(0.0);

    let days_left = match header.field(fields, CanonicalKey::DaysLeft) {
        None => None,
        Some(s) if s.eq_ignore_ascii_case("expired") => Some(DaysLeft::Expired),
        Some(s) if s.is_empty() => Some(DaysLeft::Days(0)),
        Some(s) => Some(DaysLeft::Days(parse_count(s) as i64)),
    };

    let credit_field = header.field(fields, CanonicalKey::CreditAmount);
    let credit_amount = credit_field.map(parse_money).unwrap_or(0.0);

    let mut errors = Vec::new();
    if symbol.is_empty() {
        errors.push("Symbol is required".to_string());
    }
    if strategy.is_empty() {
        errors.push("Strategy is required".to_string());
    }
    if trade_date.is_empty() {
        errors.push("Trade date is required".to_string());
    }
    if !is_stock && expiration_raw.is_empty() {
        errors.push("Expiration date is required for options strategies".to_string());
    }
    if !(quantity > 0.0) {
        errors.push("Quantity must be greater than 0".to_string());
    }
    if !is_stock && days_left.is_none() {
        errors.push("Days left is required for options strategies".to_string());
    }
    // Note: a genuinely zero credit amount on a non-stock row is flagged,
    // same as an absent one. Preserved long-standing behavior.
    if !is_stock && (credit_field.is_none() || credit_amount == 0.0) {
        errors.push("Credit amount is required for options strategies".to_string());
    }

    let (expiration_date, days_left) = if is_stock {
        ("N/A".to_string(), Some(DaysLeft::NotApplicable))
    } else {
        (expiration_raw, days_left)
    };

    ImportRecord {
        id: format!("import-{index}"),
        symbol,
        strategy,
        trade_date,
        expiration_date,
        quantity: quantity as i64,
        days_left,
        credit_amount,
        is_valid: errors.is_empty(),
        errors,
    }
}

// ---------------------------------------------------------------------------
// Batch parse
// ---------------------------------------------------------------------------

/// Every record from one parse attempt, valid and invalid alike. One record
/// per non-empty data line.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub records: Vec<ImportRecord>,
}

impl ImportBatch {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn valid_count(&self) -> usize {
        self.valid_records().count()
    }

    pub fn invalid_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_valid).count()
    }

    pub fn valid_records(&self) -> impl Iterator<Item = &ImportRecord> {
        self.records.iter().filter(|r| r.is_valid)
    }

    pub fn into_valid(self) -> Vec<ImportRecord> {
        self.records.into_iter().filter(|r| r.is_valid).collect()
    }
}

/// Parse raw CSV text into a batch. Fatal-to-attempt conditions (too few
/// lines, missing header columns) return Err before any data row is
/// processed; everything after that is per-row and never aborts the batch.
pub fn parse_batch(text: &str) -> Result<ImportBatch> {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CondorError::InvalidCsv(
            "CSV file must contain at least a header row and one data row".to_string(),
        ));
    }

    let header = HeaderMap::from_row(&tokenize_line(lines[0]))?;

    let records = lines[1..]
        .iter()
        .enumerate()
        .map(|(i, line)| validate_row(i, &tokenize_line(line), &header))
        .collect();

    Ok(ImportBatch { records })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Symbol,strategy,trade_date,expiration_date,quantity,Days left,credit_amount";

    fn batch_of(rows: &[&str]) -> ImportBatch {
        let text = format!("{HEADER}\n{}\n", rows.join("\n"));
        parse_batch(&text).unwrap()
    }

    #[test]
    fn test_tokenize_plain_line() {
        assert_eq!(
            tokenize_line("AAPL,Iron Condor,2024-01-01"),
            vec!["AAPL", "Iron Condor", "2024-01-01"]
        );
    }

    #[test]
    fn test_tokenize_quoted_comma() {
        assert_eq!(
            tokenize_line("\"Iron Condor, wide\",10"),
            vec!["Iron Condor, wide", "10"]
        );
    }

    #[test]
    fn test_tokenize_field_count_matches_unquoted_commas() {
        // commas outside quotes + 1
        assert_eq!(tokenize_line("a,b,c,d").len(), 4);
        assert_eq!(tokenize_line("\"a,b\",c").len(), 2);
        assert_eq!(tokenize_line("").len(), 1);
        assert_eq!(tokenize_line("a,,c").len(), 3);
    }

    #[test]
    fn test_tokenize_trims_fields() {
        assert_eq!(tokenize_line("  AAPL , 10 "), vec!["AAPL", "10"]);
    }

    #[test]
    fn test_normalize_header_variants() {
        assert_eq!(normalize_header("Days left"), "days_left");
        assert_eq!(normalize_header("DAYS  LEFT"), "days_left");
        assert_eq!(normalize_header(" credit_amount "), "credit_amount");
        assert_eq!(normalize_header("Symbol"), "symbol");
    }

    #[test]
    fn test_header_map_missing_columns() {
        let fields = tokenize_line("Symbol,strategy,trade_date");
        let err = HeaderMap::from_row(&fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV is missing required columns: expiration_date, quantity, days_left, credit_amount"
        );
    }

    #[test]
    fn test_header_order_independent() {
        let straight = parse_batch(&format!(
            "{HEADER}\nAAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500\n"
        ))
        .unwrap();
        let permuted = parse_batch(
            "credit_amount,Days left,quantity,expiration_date,trade_date,strategy,Symbol\n\
             500,25,10,2024-02-16,2024-01-01,Iron Condor,AAPL\n",
        )
        .unwrap();
        let a = &straight.records[0];
        let b = &permuted.records[0];
        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.quantity, b.quantity);
        assert_eq!(a.days_left, b.days_left);
        assert_eq!(a.credit_amount, b.credit_amount);
        assert_eq!(a.errors, b.errors);
        assert!(a.is_valid && b.is_valid);
    }

    #[test]
    fn test_valid_iron_condor_row() {
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500"]);
        assert_eq!(batch.total(), 1);
        let r = &batch.records[0];
        assert_eq!(r.id, "import-0");
        assert_eq!(r.symbol, "AAPL");
        assert_eq!(r.strategy, "Iron Condor");
        assert_eq!(r.trade_date, "2024-01-01");
        assert_eq!(r.expiration_date, "2024-02-16");
        assert_eq!(r.quantity, 10);
        assert_eq!(r.days_left, Some(DaysLeft::Days(25)));
        assert_eq!(r.credit_amount, 500.0);
        assert!(r.is_valid);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_stock_row_relaxation() {
        let batch = batch_of(&["TSLA,stock,2024-01-01,,5,,0"]);
        let r = &batch.records[0];
        assert!(r.is_valid, "errors: {:?}", r.errors);
        assert_eq!(r.expiration_date, "N/A");
        assert_eq!(r.days_left, Some(DaysLeft::NotApplicable));
    }

    #[test]
    fn test_stock_relaxation_case_insensitive_and_forced() {
        // Expiration and days-left inputs are overridden, not merely defaulted.
        let batch = batch_of(&["TSLA,Stock,2024-01-01,2024-06-21,5,30,0"]);
        let r = &batch.records[0];
        assert!(r.is_valid);
        assert_eq!(r.expiration_date, "N/A");
        assert_eq!(r.days_left, Some(DaysLeft::NotApplicable));
    }

    #[test]
    fn test_non_stock_missing_expiration_and_zero_credit() {
        let batch = batch_of(&["SPY,Bull Call Spread,2024-01-01,,10,20,0"]);
        let r = &batch.records[0];
        assert!(!r.is_valid);
        assert_eq!(
            r.errors,
            vec![
                "Expiration date is required for options strategies",
                "Credit amount is required for options strategies",
            ]
        );
    }

    #[test]
    fn test_zero_credit_is_invalid_even_though_numeric() {
        // Documented surprising rule: "0" is a parseable non-negative amount
        // but still fails the non-stock credit rule.
        let batch = batch_of(&["SPY,Iron Condor,2024-01-01,2024-02-16,10,20,0"]);
        let r = &batch.records[0];
        assert!(!r.is_valid);
        assert_eq!(
            r.errors,
            vec!["Credit amount is required for options strategies"]
        );
    }

    #[test]
    fn test_header_only_file_is_fatal() {
        let err = parse_batch(&format!("{HEADER}\n")).unwrap_err();
        assert!(err
            .to_string()
            .contains("must contain at least a header row and one data row"));
    }

    #[test]
    fn test_empty_file_is_fatal() {
        assert!(parse_batch("").is_err());
        assert!(parse_batch("\n\n  \n").is_err());
    }

    #[test]
    fn test_blank_lines_ignored_anywhere() {
        let text = format!(
            "\n{HEADER}\n\nAAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500\n   \n\
             MSFT,Strangle,2024-01-02,2024-03-15,2,60,120\n\n\n"
        );
        let batch = parse_batch(&text).unwrap();
        assert_eq!(batch.total(), 2);
        assert_eq!(batch.records[0].id, "import-0");
        assert_eq!(batch.records[1].id, "import-1");
    }

    #[test]
    fn test_record_count_matches_data_lines() {
        let batch = batch_of(&[
            "AAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500",
            ",,,,,,",
            "bad row",
        ]);
        assert_eq!(batch.total(), 3);
        for r in &batch.records {
            assert_eq!(r.is_valid, r.errors.is_empty());
        }
        assert_eq!(batch.valid_count() + batch.invalid_count(), batch.total());
    }

    #[test]
    fn test_currency_decoration_stripped() {
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,10,25,\"$1,500.00\""]);
        let r = &batch.records[0];
        assert!(r.is_valid);
        assert_eq!(r.credit_amount, 1500.0);
    }

    #[test]
    fn test_expired_sentinel_case_insensitive() {
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,10,EXPIRED,500"]);
        assert_eq!(batch.records[0].days_left, Some(DaysLeft::Expired));
    }

    #[test]
    fn test_quantity_parse_failure_coerces_to_zero() {
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,ten,25,500"]);
        let r = &batch.records[0];
        assert_eq!(r.quantity, 0);
        assert!(!r.is_valid);
        assert_eq!(r.errors, vec!["Quantity must be greater than 0"]);
    }

    #[test]
    fn test_quantity_truncated_to_integer() {
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,10.9,25,500"]);
        assert_eq!(batch.records[0].quantity, 10);
        assert!(batch.records[0].is_valid);
    }

    #[test]
    fn test_short_row_missing_days_left() {
        // Row ends before the days_left and credit_amount columns.
        let batch = batch_of(&["AAPL,Iron Condor,2024-01-01,2024-02-16,10"]);
        let r = &batch.records[0];
        assert_eq!(r.days_left, None);
        assert!(!r.is_valid);
        assert_eq!(
            r.errors,
            vec![
                "Days left is required for options strategies",
                "Credit amount is required for options strategies",
            ]
        );
    }

    #[test]
    fn test_all_failures_collected_in_order() {
        let batch = batch_of(&[",,,,0,,"]);
        let r = &batch.records[0];
        assert_eq!(
            r.errors,
            vec![
                "Symbol is required",
                "Strategy is required",
                "Trade date is required",
                "Expiration date is required for options strategies",
                "Quantity must be greater than 0",
                "Credit amount is required for options strategies",
            ]
        );
        // Empty days_left coerces to 0, which counts as present.
        assert_eq!(r.days_left, Some(DaysLeft::Days(0)));
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,234.56"), 1234.56);
        assert_eq!(parse_money("500"), 500.0);
        assert_eq!(parse_money("not_a_number"), 0.0);
        assert_eq!(parse_money(""), 0.0);
    }

    #[test]
    fn test_into_valid_keeps_only_valid() {
        let batch = batch_of(&[
            "AAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500",
            "SPY,Bull Call Spread,2024-01-01,,10,20,0",
            "TSLA,stock,2024-01-01,,5,,0",
        ]);
        assert_eq!(batch.valid_count(), 2);
        assert_eq!(batch.invalid_count(), 1);
        let valid = batch.into_valid();
        assert_eq!(valid.len(), 2);
        assert!(valid.iter().all(|r| r.is_valid));
    }
}
