use log::{debug, warn};

use crate::models::{CategorizedTransaction, CategoryRule, Transaction, UNCATEGORIZED};

/// Ordered merchant rules. The first rule whose substring occurs in a
/// description decides the category; there is no longest-match preference.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    patterns: Vec<String>,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let total = rules.len();
        let rules: Vec<CategoryRule> = rules
            .into_iter()
            .filter(|r| {
                let keep = !r.merchant_substring.is_empty() && !r.category.is_empty();
                if !keep {
                    warn!(
                        "ignoring merchant rule with empty field: '{}' -> '{}'",
                        r.merchant_substring, r.category
                    );
                }
                keep
            })
            .collect();
        let patterns = rules
            .iter()
            .map(|r| r.merchant_substring.to_lowercase())
            .collect();
        debug!("loaded {} of {total} merchant rules", rules.len());
        Self { rules, patterns }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Index of the first rule matching `description`, if any.
    pub fn matching_rule(&self, description: &str) -> Option<usize> {
        if description.is_empty() {
            return None;
        }
        let desc_lower = description.to_lowercase();
        self.patterns.iter().position(|p| desc_lower.contains(p.as_str()))
    }

    pub fn categorize(&self, description: &str) -> &str {
        self.matching_rule(description)
            .map(|i| self.rules[i].category.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn categorize_transaction(&self, txn: Transaction) -> CategorizedTransaction {
        let category = self.categorize(&txn.description).to_string();
        CategorizedTransaction {
            transaction: txn,
            category,
        }
    }

    /// Categorize a whole table, preserving row order.
    pub fn categorize_all(&self, txns: Vec<Transaction>) -> Vec<CategorizedTransaction> {
        txns.into_iter()
            .map(|t| self.categorize_transaction(t))
            .collect()
    }

    /// How many transactions each rule claimed, and how many no rule claimed.
    pub fn rule_hits(&self, txns: &[CategorizedTransaction]) -> CategorizeResult {
        let mut hits = vec![0usize; self.rules.len()];
        let mut uncategorized = 0usize;
        for txn in txns {
            match self.matching_rule(txn.description()) {
                Some(i) => hits[i] += 1,
                None => uncategorized += 1,
            }
        }
        CategorizeResult {
            hits,
            uncategorized,
        }
    }
}

pub struct CategorizeResult {
    /// Parallel to `Categorizer::rules()`.
    pub hits: Vec<usize>,
    pub uncategorized: usize,
}

impl CategorizeResult {
    pub fn categorized(&self) -> usize {
        self.hits.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn rules(pairs: &[(&str, &str)]) -> Categorizer {
        Categorizer::new(
            pairs
                .iter()
                .map(|(m, c)| CategoryRule::new(*m, *c))
                .collect(),
        )
    }

    fn txn(description: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            description: description.to_string(),
            amount: Decimal::new(1000, 2),
            transaction_type: TransactionType::Debit,
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        let c = rules(&[("walmart", "Groceries")]);
        assert_eq!(c.categorize("WALMART SUPERCENTER #12"), "Groceries");
        assert_eq!(c.categorize("Walmart.com"), "Groceries");
    }

    #[test]
    fn test_first_rule_wins() {
        let c = rules(&[("Star", "Coffee"), ("Starbucks", "Dining")]);
        assert_eq!(c.categorize("STARBUCKS #4521"), "Coffee");
    }

    #[test]
    fn test_no_match_is_uncategorized() {
        let c = rules(&[("Uber", "Transportation")]);
        assert_eq!(c.categorize("RANDOM VENDOR XYZ"), UNCATEGORIZED);
    }

    #[test]
    fn test_empty_description_is_uncategorized() {
        let c = rules(&[("a", "Letters")]);
        assert_eq!(c.categorize(""), UNCATEGORIZED);
    }

    #[test]
    fn test_empty_rules_are_dropped() {
        let c = rules(&[("", "Everything"), ("Netflix", ""), ("Netflix", "Entertainment")]);
        assert_eq!(c.rules().len(), 1);
        assert_eq!(c.categorize("anything at all"), UNCATEGORIZED);
        assert_eq!(c.categorize("NETFLIX.COM"), "Entertainment");
    }

    #[test]
    fn test_whitespace_merchant_is_a_real_pattern() {
        let c = rules(&[(" ", "Spaced"), ("Netflix", "Entertainment")]);
        assert_eq!(c.rules().len(), 2);
        assert_eq!(c.categorize("NETFLIX COM"), "Spaced");
        assert_eq!(c.categorize("NETFLIX.COM"), "Entertainment");
    }

    #[test]
    fn test_duplicate_merchants_keep_sequential_order() {
        let c = rules(&[("Amazon", "Shopping"), ("Amazon", "Other")]);
        assert_eq!(c.categorize("AMAZON MKTPLACE"), "Shopping");
    }

    #[test]
    fn test_categorize_all_preserves_order() {
        let c = rules(&[("Shell", "Transportation")]);
        let out = c.categorize_all(vec![txn("SHELL OIL"), txn("Paycheck"), txn("shell gas")]);
        let cats: Vec<&str> = out.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(cats, vec!["Transportation", UNCATEGORIZED, "Transportation"]);
        assert_eq!(out[1].description(), "Paycheck");
    }

    #[test]
    fn test_rule_hits() {
        let c = rules(&[("Star", "Coffee"), ("Starbucks", "Dining"), ("Rent", "Housing")]);
        let out = c.categorize_all(vec![
            txn("STARBUCKS"),
            txn("starbucks reserve"),
            txn("RENT PAYMENT"),
            txn("Unknown"),
        ]);
        let result = c.rule_hits(&out);
        assert_eq!(result.hits, vec![2, 0, 1]);
        assert_eq!(result.uncategorized, 1);
        assert_eq!(result.categorized(), 3);
    }
}
