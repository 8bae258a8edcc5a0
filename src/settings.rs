use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};
use crate::models::{CategoryBudget, GoalTerm, SavingsGoal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: String,
    pub transactions_file: String,
    pub rules_file: String,
    pub rates_file: String,
    pub news_file: String,
    /// Denominator of the overall "budget used" figure.
    pub reference_budget: Decimal,
    pub budgets: Vec<CategoryBudget>,
    pub savings_goals: Vec<SavingsGoal>,
    /// Percent of income set aside per goal name.
    pub allocations: BTreeMap<String, Decimal>,
    /// Income figure for savings projections; total income when unset.
    pub savings_income: Option<Decimal>,
    pub top_n: usize,
    pub currencies: Vec<String>,
}

pub fn default_budgets() -> Vec<CategoryBudget> {
    [
        ("Housing", 1200),
        ("Food", 500),
        ("Transportation", 300),
        ("Entertainment", 200),
        ("Utilities", 400),
        ("Other", 150),
    ]
    .into_iter()
    .map(|(c, l)| CategoryBudget::new(c, Decimal::from(l)))
    .collect()
}

pub fn default_savings_goals() -> Vec<SavingsGoal> {
    vec![
        SavingsGoal::new(GoalTerm::ShortTerm, "Vacation", Decimal::from(1000)),
        SavingsGoal::new(GoalTerm::ShortTerm, "Emergency Fund", Decimal::from(500)),
        SavingsGoal::new(GoalTerm::LongTerm, "Home Purchase", Decimal::from(20000)),
        SavingsGoal::new(GoalTerm::LongTerm, "Retirement", Decimal::from(50000)),
    ]
}

pub fn default_allocations() -> BTreeMap<String, Decimal> {
    [
        ("Vacation", 10),
        ("Emergency Fund", 5),
        ("Home Purchase", 15),
        ("Retirement", 20),
    ]
    .into_iter()
    .map(|(g, p)| (g.to_string(), Decimal::from(p)))
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            transactions_file: "sample_transaction_sheet.xlsx".to_string(),
            rules_file: "merchant_categories.json".to_string(),
            rates_file: "currency_rates.json".to_string(),
            news_file: "financial_news.json".to_string(),
            reference_budget: Decimal::from(5000),
            budgets: default_budgets(),
            savings_goals: default_savings_goals(),
            allocations: default_allocations(),
            savings_income: None,
            top_n: 5,
            currencies: ["USD", "EUR", "INR", "GBP"].map(String::from).to_vec(),
        }
    }
}

impl Settings {
    /// Resolve a configured file name against `data_dir` unless it is absolute.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let p = PathBuf::from(shellexpand_path(file));
        if p.is_absolute() {
            p
        } else {
            PathBuf::from(shellexpand_path(&self.data_dir)).join(p)
        }
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.resolve(&self.transactions_file)
    }

    pub fn rules_path(&self) -> PathBuf {
        self.resolve(&self.rules_file)
    }

    pub fn rates_path(&self) -> PathBuf {
        self.resolve(&self.rates_file)
    }

    pub fn news_path(&self) -> PathBuf {
        self.resolve(&self.news_file)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendview")
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("spendview")
}

/// Missing file or missing fields fall back to defaults. A file that exists
/// but does not parse is an error, so a typo never silently resets budgets.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        warn!("settings file {} is empty, using defaults", path.display());
        return Ok(Settings::default());
    }
    serde_json::from_str(&content)
        .map_err(|e| SpendError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SpendError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
