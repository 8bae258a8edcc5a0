pub mod convert;
pub mod dashboard;
pub mod init;
pub mod news;
pub mod report;
pub mod rules;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::debug;
use rust_decimal::Decimal;

use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::importer::load_transactions;
use crate::settings::{default_settings_path, load_settings, Settings};
use crate::sources::load_rules;
use crate::views::Inputs;

#[derive(Parser)]
#[command(
    name = "spendview",
    version,
    about = "Categorize bank transactions and track budgets and savings goals."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/spendview/settings.json)
    #[arg(long, global = true, env = "SPENDVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transaction sheet to read instead of the configured one (CSV or XLSX)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write default settings and starter data files.
    Init {
        /// Data directory (default: ~/Documents/spendview)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Also write a sample transaction sheet and point settings at it
        #[arg(long)]
        demo: bool,
        /// Overwrite existing settings and data files
        #[arg(long)]
        force: bool,
    },
    /// Income, expenses, savings and budget used.
    Summary,
    /// Top transactions, spending categories and merchants.
    Top {
        /// How many entries per list (default: settings top_n)
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Expense breakdown by category.
    Categories,
    /// Budget vs actual per category, with alerts.
    Budget,
    /// Savings-goal progress.
    Savings {
        /// Income to allocate (default: settings, else total income)
        #[arg(long)]
        income: Option<Decimal>,
    },
    /// Daily income vs expenses and cumulative savings.
    Trend,
    /// Every transaction with its category.
    Transactions,
    /// Merchant categorization rules and how often each matched.
    Rules,
    /// Convert an amount between currencies.
    Convert {
        amount: Decimal,
        base: String,
        target: String,
        /// Swap base and target before converting
        #[arg(long)]
        swap: bool,
    },
    /// Financial news headlines.
    News,
    /// Show configuration and data source status.
    Status,
    /// Interactive dashboard.
    Dashboard,
}

/// Settings, rules and the categorized table for one invocation.
pub struct Context {
    pub settings: Settings,
    pub transactions_path: PathBuf,
    pub categorizer: Categorizer,
    pub inputs: Inputs,
}

impl Context {
    pub fn load(config: Option<PathBuf>, file: Option<PathBuf>) -> Result<Self> {
        let settings_path = settings_path(config);
        let settings = load_settings(&settings_path)?;
        debug!("settings from {}", settings_path.display());

        let transactions_path = file.unwrap_or_else(|| settings.transactions_path());
        let categorizer = Categorizer::new(load_rules(&settings.rules_path()));
        let transactions = categorizer.categorize_all(load_transactions(&transactions_path)?);
        let inputs = Inputs::new(&settings, transactions);

        Ok(Self {
            settings,
            transactions_path,
            categorizer,
            inputs,
        })
    }
}

pub fn settings_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(default_settings_path)
}
