use std::path::{Path, PathBuf};

use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::fmt::number;
use crate::importer::load_transactions;
use crate::settings::{load_settings, shellexpand_path};
use crate::sources::{load_articles, load_rates, load_rules};

use super::settings_path;

fn presence(path: &Path) -> &'static str {
    if path.exists() {
        "ok"
    } else {
        "missing"
    }
}

pub fn run(config: Option<PathBuf>, file: Option<PathBuf>) -> Result<()> {
    let path = settings_path(config);
    let settings = load_settings(&path)?;
    let transactions_path = file.unwrap_or_else(|| settings.transactions_path());

    println!(
        "Settings:      {} ({})",
        path.display(),
        if path.exists() { "ok" } else { "defaults" }
    );
    println!("Data dir:      {}", shellexpand_path(&settings.data_dir));
    println!();
    for (label, source) in [
        ("Transactions", &transactions_path),
        ("Rules", &settings.rules_path()),
        ("Rates", &settings.rates_path()),
        ("News", &settings.news_path()),
    ] {
        println!("{:<14} {} ({})", format!("{label}:"), source.display(), presence(source));
    }

    let categorizer = Categorizer::new(load_rules(&settings.rules_path()));
    let rates = load_rates(&settings.rates_path());
    let articles = load_articles(&settings.news_path());

    println!();
    match load_transactions(&transactions_path) {
        Ok(txns) => {
            let categorized = categorizer.categorize_all(txns);
            let hits = categorizer.rule_hits(&categorized);
            println!("Transactions:  {}", number(categorized.len()));
            println!("Uncategorized: {}", number(hits.uncategorized));
        }
        Err(e) => println!("Transactions:  unreadable ({e})"),
    }
    println!("Rules:         {}", number(categorizer.rules().len()));
    println!("Currencies:    {}", rates.codes().collect::<Vec<_>>().join(", "));
    println!("Articles:      {}", number(articles.len()));

    if !path.exists() {
        println!();
        println!("No settings file yet. Run `spendview init` to set up.");
    }
    Ok(())
}
