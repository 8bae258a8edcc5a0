//! JSON data sources: merchant rules, currency rates and news articles.
//!
//! A source that is missing, unreadable or malformed is replaced by an empty
//! collection. The failure is logged, never returned.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::currency::RateTable;
use crate::error::Result;
use crate::models::CategoryRule;
use crate::news::Article;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MerchantFile {
    #[serde(default)]
    pub merchants: Vec<CategoryRule>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RatesFile {
    #[serde(default)]
    pub rates: BTreeMap<String, Decimal>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewsFile {
    #[serde(default)]
    pub articles: Vec<Article>,
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("{what} file {} unavailable ({e}), using none", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(v) => {
            debug!("loaded {what} from {}", path.display());
            v
        }
        Err(e) => {
            warn!("{what} file {} is malformed ({e}), using none", path.display());
            T::default()
        }
    }
}

/// Merchant rules in file order.
pub fn load_rules(path: &Path) -> Vec<CategoryRule> {
    load_json_or_default::<MerchantFile>(path, "merchant rules").merchants
}

pub fn load_rates(path: &Path) -> RateTable {
    RateTable::new(load_json_or_default::<RatesFile>(path, "currency rates").rates)
}

pub fn load_articles(path: &Path) -> Vec<Article> {
    load_json_or_default::<NewsFile>(path, "news").articles
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
