use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "Symbol,strategy,trade_date,expiration_date,quantity,Days left,credit_amount";

fn write_csv(dir: &std::path::Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn import_commits_valid_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "trades.csv",
        &[
            "AAPL,Iron Condor,2024-01-01,2024-02-16,10,25,500",
            "SPY,Bull Call Spread,2024-01-01,,10,20,0",
            "TSLA,stock,2024-01-01,,5,,0",
        ],
    );

    Command::cargo_bin("condor")
        .unwrap()
        .args(["import", csv.to_str().unwrap(), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 valid"))
        .stdout(predicate::str::contains("1 invalid"))
        .stdout(predicate::str::contains("3 total"))
        .stdout(predicate::str::contains("2 imported"));
}

#[test]
fn import_shows_row_errors_in_preview() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "trades.csv",
        &["SPY,Bull Call Spread,2024-01-01,,10,20,0"],
    );

    Command::cargo_bin("condor")
        .unwrap()
        .args(["import", csv.to_str().unwrap(), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Expiration date is required for options strategies",
        ))
        .stdout(predicate::str::contains(
            "Credit amount is required for options strategies",
        ))
        .stdout(predicate::str::contains("Nothing to import."));
}

#[test]
fn import_header_only_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "trades.csv", &[]);

    Command::cargo_bin("condor")
        .unwrap()
        .args(["import", csv.to_str().unwrap(), "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "must contain at least a header row and one data row",
        ));
}

#[test]
fn import_rejects_non_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.xlsx");
    std::fs::write(&path, "not a csv").unwrap();

    Command::cargo_bin("condor")
        .unwrap()
        .args(["import", path.to_str().unwrap(), "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a CSV file"));
}

#[test]
fn import_missing_columns_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    std::fs::write(&path, "Symbol,strategy\nAAPL,Iron Condor\n").unwrap();

    Command::cargo_bin("condor")
        .unwrap()
        .args(["import", path.to_str().unwrap(), "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required columns"));
}
