use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::CategoryRule;
use crate::news::Article;
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::sources::{write_json, MerchantFile, NewsFile, RatesFile};

use super::settings_path;

const DEMO_SHEET: &str = "sample_transactions.csv";

const STARTER_RULES: &[(&str, &str)] = &[
    ("Landlord", "Housing"),
    ("Rent", "Housing"),
    ("Walmart", "Food"),
    ("Whole Foods", "Food"),
    ("Starbucks", "Food"),
    ("McDonald", "Food"),
    ("Uber", "Transportation"),
    ("Shell", "Transportation"),
    ("Netflix", "Entertainment"),
    ("Spotify", "Entertainment"),
    ("AMC", "Entertainment"),
    ("Electric", "Utilities"),
    ("Comcast", "Utilities"),
    ("Water", "Utilities"),
    ("Amazon", "Other"),
    ("Payroll", "Income"),
];

const STARTER_RATES: &[(&str, i64, u32)] = &[
    ("USD", 100, 2),
    ("EUR", 92, 2),
    ("GBP", 79, 2),
    ("INR", 8312, 2),
];

/// (day of month, description, amount, type)
const DEMO_ROWS: &[(u32, &str, &str, &str)] = &[
    (1, "ACME CORP PAYROLL", "4200.00", "Credit"),
    (1, "LANDLORD PROPERTY MGMT", "1250.00", "Debit"),
    (2, "STARBUCKS #4521", "6.45", "Debit"),
    (3, "WALMART SUPERCENTER", "142.87", "Debit"),
    (4, "UBER TRIP", "23.10", "Debit"),
    (5, "NETFLIX.COM", "15.49", "Debit"),
    (7, "SHELL OIL 5741", "48.20", "Debit"),
    (9, "CITY ELECTRIC CO", "96.33", "Debit"),
    (10, "WHOLE FOODS MARKET", "88.12", "Debit"),
    (12, "AMAZON MKTPLACE", "64.99", "Debit"),
    (14, "STARBUCKS #4521", "5.95", "Debit"),
    (15, "ACME CORP PAYROLL", "4200.00", "Credit"),
    (16, "AMC THEATRES", "32.00", "Debit"),
    (18, "COMCAST CABLE", "79.99", "Debit"),
    (20, "FARMERS MARKET", "27.40", "Debit"),
    (22, "UBER TRIP", "18.75", "Debit"),
    (25, "WALMART SUPERCENTER", "203.66", "Debit"),
    (27, "SPOTIFY USA", "10.99", "Debit"),
    (28, "FREELANCE INVOICE 1042", "650.00", "Credit"),
];

fn starter_articles() -> Vec<Article> {
    vec![
        Article::new(
            "Central bank holds rates steady",
            "https://example.com/news/rates",
            "Policymakers left the benchmark rate unchanged and signalled patience on future cuts.",
        ),
        Article::new(
            "Grocery prices ease for third month",
            "https://example.com/news/groceries",
            "Food-at-home inflation slowed again, offering some relief to household budgets.",
        ),
        Article::new(
            "How much should an emergency fund hold?",
            "https://example.com/news/emergency-fund",
            "Planners still suggest three to six months of essential expenses as a starting point.",
        ),
    ]
}

/// Write `value` unless the file already exists. Returns whether it wrote.
fn write_starter<T: serde::Serialize>(path: &Path, value: &T, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!("  kept     {}", path.display());
        return Ok(false);
    }
    write_json(path, value)?;
    println!("  wrote    {}", path.display());
    Ok(true)
}

pub fn write_demo_sheet(path: &Path, year: i32, month: u32) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Date", "Description", "Amount", "Transaction Type"])?;
    for &(day, desc, amount, kind) in DEMO_ROWS {
        let date = format!("{year:04}-{month:02}-{day:02}");
        wtr.write_record([date.as_str(), desc, amount, kind])?;
    }
    wtr.flush()?;
    Ok(DEMO_ROWS.len())
}

pub fn run(config: Option<PathBuf>, data_dir: Option<String>, demo: bool, force: bool) -> Result<()> {
    let path = settings_path(config);
    let mut settings = if force {
        Default::default()
    } else {
        load_settings(&path)?
    };
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if demo {
        settings.transactions_file = DEMO_SHEET.to_string();
    }

    let data_dir = PathBuf::from(shellexpand_path(&settings.data_dir));
    std::fs::create_dir_all(&data_dir)?;
    println!("Initializing spendview in {}", data_dir.display());

    let rules = MerchantFile {
        merchants: STARTER_RULES
            .iter()
            .map(|(m, c)| CategoryRule::new(*m, *c))
            .collect(),
    };
    write_starter(&settings.rules_path(), &rules, force)?;

    let rates = RatesFile {
        rates: STARTER_RATES
            .iter()
            .map(|(code, num, scale)| (code.to_string(), Decimal::new(*num, *scale)))
            .collect::<BTreeMap<_, _>>(),
    };
    write_starter(&settings.rates_path(), &rates, force)?;

    let news = NewsFile {
        articles: starter_articles(),
    };
    write_starter(&settings.news_path(), &news, force)?;

    if demo {
        let sheet = settings.transactions_path();
        if sheet.exists() && !force {
            println!("  kept     {}", sheet.display());
        } else {
            let today = chrono::Local::now().date_naive();
            let rows = write_demo_sheet(&sheet, chrono::Datelike::year(&today), chrono::Datelike::month(&today))?;
            println!("  wrote    {} ({rows} transactions)", sheet.display());
        }
    }

    save_settings(&path, &settings)?;
    println!("  settings {}", path.display());
    println!();
    println!("Try these next:");
    println!("  spendview summary");
    println!("  spendview budget");
    println!("  spendview dashboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::Categorizer;
    use crate::importer::load_transactions;
    use crate::models::UNCATEGORIZED;

    #[test]
    fn test_demo_sheet_loads_and_categorizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEMO_SHEET);
        let written = write_demo_sheet(&path, 2024, 9).unwrap();
        let txns = load_transactions(&path).unwrap();
        assert_eq!(txns.len(), written);

        let categorizer = Categorizer::new(
            STARTER_RULES
                .iter()
                .map(|(m, c)| CategoryRule::new(*m, *c))
                .collect(),
        );
        let categorized = categorizer.categorize_all(txns);
        let uncategorized: Vec<&str> = categorized
            .iter()
            .filter(|t| t.category == UNCATEGORIZED)
            .map(|t| t.description())
            .collect();
        assert_eq!(uncategorized, vec!["FARMERS MARKET", "FREELANCE INVOICE 1042"]);
    }
}
