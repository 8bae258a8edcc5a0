use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::currency::RateTable;
use crate::error::Result;
use crate::settings::load_settings;
use crate::sources::load_rates;

use super::settings_path;

pub fn run(config: Option<PathBuf>, amount: Decimal, base: &str, target: &str, swap: bool) -> Result<()> {
    let settings = load_settings(&settings_path(config))?;
    let rates = load_rates(&settings.rates_path());
    println!("{}", conversion_line(&rates, amount, base, target, swap));
    Ok(())
}

/// The converted amount, or the failure message for an unknown pair.
pub fn conversion_line(rates: &RateTable, amount: Decimal, base: &str, target: &str, swap: bool) -> String {
    let (base, target) = if swap { (target, base) } else { (base, target) };
    match rates.convert(amount, base, target) {
        Ok(conversion) => conversion.to_string(),
        Err(e) => e.to_string(),
    }
}
