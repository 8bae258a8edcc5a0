use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Rates relative to a common base currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Conversion failed. Try again.")]
    UnknownCurrency(String),
    #[error("Conversion failed. Try again.")]
    ZeroRate(String),
    #[error("Conversion failed. Try again.")]
    InvalidAmount(String),
    #[error("Conversion failed. Try again.")]
    Overflow(Decimal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: Decimal,
    pub base: String,
    pub target: String,
    pub rate: Decimal,
    /// Rounded to cents.
    pub converted: Decimal,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {:.2} {}",
            self.amount.normalize(),
            self.base,
            self.converted,
            self.target
        )
    }
}

impl RateTable {
    pub fn new(rates: BTreeMap<String, Decimal>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(code, rate)| (code.trim().to_ascii_uppercase(), rate))
            .collect();
        Self { rates }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    /// `amount * rate[target] / rate[base]`.
    pub fn convert(
        &self,
        amount: Decimal,
        base: &str,
        target: &str,
    ) -> Result<Conversion, ConversionError> {
        let base = base.trim().to_ascii_uppercase();
        let target = target.trim().to_ascii_uppercase();
        let base_rate = self
            .rate(&base)
            .ok_or_else(|| ConversionError::UnknownCurrency(base.clone()))?;
        let target_rate = self
            .rate(&target)
            .ok_or_else(|| ConversionError::UnknownCurrency(target.clone()))?;
        if base_rate.is_zero() {
            return Err(ConversionError::ZeroRate(base));
        }
        let rate = target_rate
            .checked_div(base_rate)
            .ok_or(ConversionError::Overflow(amount))?;
        let converted = amount
            .checked_mul(rate)
            .ok_or(ConversionError::Overflow(amount))?
            .round_dp(2);
        Ok(Conversion {
            amount,
            base,
            target,
            rate,
            converted,
        })
    }
}
