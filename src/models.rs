use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category assigned when no merchant rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Parse the spreadsheet's "Transaction Type" cell. Case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "credit" | "cr" => Some(Self::Credit),
            "debit" | "dr" => Some(Self::Debit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the transaction table. `amount` is never negative; direction
/// is carried by `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.transaction_type == TransactionType::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }
}

/// A merchant substring and the category it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    #[serde(rename = "merchant")]
    pub merchant_substring: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(merchant_substring: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            merchant_substring: merchant_substring.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: String,
}

impl CategorizedTransaction {
    pub fn date(&self) -> NaiveDate {
        self.transaction.date
    }

    pub fn description(&self) -> &str {
        &self.transaction.description
    }

    pub fn amount(&self) -> Decimal {
        self.transaction.amount
    }

    pub fn is_credit(&self) -> bool {
        self.transaction.is_credit()
    }

    pub fn is_debit(&self) -> bool {
        self.transaction.is_debit()
    }
}

/// Spending limit for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub limit: Decimal,
}

impl CategoryBudget {
    pub fn new(category: impl Into<String>, limit: Decimal) -> Self {
        Self {
            category: category.into(),
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GoalTerm {
    #[serde(rename = "Short Term")]
    ShortTerm,
    #[serde(rename = "Long Term")]
    LongTerm,
}

impl GoalTerm {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShortTerm => "Short Term",
            Self::LongTerm => "Long Term",
        }
    }
}

impl fmt::Display for GoalTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub term: GoalTerm,
    pub name: String,
    pub target: Decimal,
}

impl SavingsGoal {
    pub fn new(term: GoalTerm, name: impl Into<String>, target: Decimal) -> Self {
        Self {
            term,
            name: name.into(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(TransactionType::parse("Credit"), Some(TransactionType::Credit));
        assert_eq!(TransactionType::parse(" DEBIT "), Some(TransactionType::Debit));
        assert_eq!(TransactionType::parse("refund"), None);
    }

    #[test]
    fn test_rule_deserializes_from_merchant_key() {
        let rule: CategoryRule =
            serde_json::from_str(r#"{"merchant": "Starbucks", "category": "Food"}"#).unwrap();
        assert_eq!(rule, CategoryRule::new("Starbucks", "Food"));
    }

    #[test]
    fn test_goal_term_serde_labels() {
        let json = serde_json::to_string(&GoalTerm::ShortTerm).unwrap();
        assert_eq!(json, "\"Short Term\"");
        let term: GoalTerm = serde_json::from_str("\"Long Term\"").unwrap();
        assert_eq!(term, GoalTerm::LongTerm);
    }
}
