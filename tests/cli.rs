use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SHEET: &str = "\
Date,Description,Amount,Transaction Type
2024-09-01,ACME PAYROLL,3000.00,Credit
2024-09-02,Landlord Rent,1800.00,Debit
2024-09-03,STARBUCKS #12,6.50,Debit
2024-09-03,Whole Foods,650.00,Debit
2024-09-04,Mystery Shop,20.00,Debit
";

const RULES: &str = r#"{"merchants": [
    {"merchant": "Landlord", "category": "Housing"},
    {"merchant": "Starbucks", "category": "Food"},
    {"merchant": "Whole Foods", "category": "Food"}
]}"#;

const RATES: &str = r#"{"rates": {"USD": 1.0, "EUR": 0.9}}"#;

/// A data dir with transactions, rules and rates, plus a settings file
/// pointing at it. Returns the temp dir and the settings path.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("transactions.csv"), SHEET).unwrap();
    std::fs::write(data.join("merchant_categories.json"), RULES).unwrap();
    std::fs::write(data.join("currency_rates.json"), RATES).unwrap();
    let settings = dir.path().join("settings.json");
    write_settings(&settings, &data);
    (dir, settings)
}

fn write_settings(path: &Path, data: &Path) {
    let json = serde_json::json!({
        "data_dir": data.to_string_lossy(),
        "transactions_file": "transactions.csv",
        "budgets": [
            {"category": "Housing", "limit": 2000},
            {"category": "Food", "limit": 500}
        ]
    });
    std::fs::write(path, json.to_string()).unwrap();
}

fn spendview(settings: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendview").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(settings);
    cmd
}

#[test]
fn summary_reports_totals() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("$3,000.00"))
        .stdout(predicate::str::contains("$2,476.50"))
        .stdout(predicate::str::contains("$523.50"))
        .stdout(predicate::str::contains("49.5%"));
}

#[test]
fn no_subcommand_without_tty_prints_summary() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Summary"));
}

#[test]
fn budget_flags_exceeded_category() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .arg("budget")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Budget exceeded for Food! You've spent $656.50 (Budget: $500.00)",
        ))
        .stdout(predicate::str::contains("Budget exceeded for Housing").not());
}

#[test]
fn top_merchants_respect_limit() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .args(["top", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 2 Merchants"))
        .stdout(predicate::str::contains("Landlord Rent"))
        .stdout(predicate::str::contains("Mystery Shop").not());
}

#[test]
fn rules_count_uncategorized() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Categorized: 3  Uncategorized: 2"));
}

#[test]
fn file_flag_overrides_configured_sheet() {
    let (dir, settings) = workspace();
    let other = dir.path().join("other.csv");
    std::fs::write(
        &other,
        "Date,Description,Amount,Transaction Type\n2024-10-01,Bonus,10.00,Credit\n",
    )
    .unwrap();
    spendview(&settings)
        .arg("--file")
        .arg(&other)
        .arg("transactions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transaction Details (1)"))
        .stdout(predicate::str::contains("Bonus"));
}

#[test]
fn missing_sheet_is_an_empty_table() {
    let (dir, settings) = workspace();
    spendview(&settings)
        .arg("--file")
        .arg(dir.path().join("nope.csv"))
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("$0.00"));
}

#[test]
fn convert_between_known_currencies() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .args(["convert", "100", "USD", "EUR"])
        .assert()
        .success()
        .stdout("100 USD = 90.00 EUR\n");
    spendview(&settings)
        .args(["convert", "90", "USD", "EUR", "--swap"])
        .assert()
        .success()
        .stdout("90 EUR = 100.00 USD\n");
}

#[test]
fn convert_unknown_currency_fails_softly() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .args(["convert", "100", "USD", "JPY"])
        .assert()
        .success()
        .stdout("Conversion failed. Try again.\n");
}

#[test]
fn news_without_source_prints_placeholder() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .arg("news")
        .assert()
        .success()
        .stdout(predicate::str::contains("No news available at the moment."));
}

#[test]
fn malformed_settings_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, "{ not json").unwrap();
    spendview(&settings)
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn init_demo_writes_sources_and_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("config").join("settings.json");
    let data = dir.path().join("data");
    spendview(&settings)
        .arg("init")
        .arg("--demo")
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success();

    assert!(settings.exists());
    for file in [
        "merchant_categories.json",
        "currency_rates.json",
        "financial_news.json",
        "sample_transactions.csv",
    ] {
        assert!(data.join(file).exists(), "{file} not written");
    }

    spendview(&settings)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("$9,050.00"));
    spendview(&settings)
        .args(["convert", "100", "USD", "EUR"])
        .assert()
        .success()
        .stdout("100 USD = 92.00 EUR\n");
}

#[test]
fn init_keeps_existing_files_without_force() {
    let (dir, settings) = workspace();
    let data = dir.path().join("data");
    spendview(&settings)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("kept"));
    let rules = std::fs::read_to_string(data.join("merchant_categories.json")).unwrap();
    assert_eq!(rules, RULES);
}

#[test]
fn status_counts_sources() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  5\n"))
        .stdout(predicate::str::contains("Uncategorized: 2\n"))
        .stdout(predicate::str::contains("Rules:         3\n"))
        .stdout(predicate::str::contains("Currencies:    EUR, USD\n"))
        .stdout(predicate::str::contains("financial_news.json (missing)"));
}

#[test]
fn convert_huge_amount_fails_softly() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .args(["convert", "79228162514264337593543950335", "EUR", "USD"])
        .assert()
        .success()
        .stdout("Conversion failed. Try again.\n");
}

#[test]
fn savings_with_huge_income_does_not_abort() {
    let (_dir, settings) = workspace();
    spendview(&settings)
        .args(["savings", "--income", "79228162514264337593543950335"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vacation"));
}
