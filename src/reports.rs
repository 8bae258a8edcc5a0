use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CategorizedTransaction, CategoryBudget, GoalTerm, SavingsGoal};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `part / whole * 100`, or 0 when `whole` is not positive.
fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// `total + amount`, saturating at the Decimal range with a warning.
fn add_capped(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        warn!("running total overflowed adding {amount}, capped");
        total.saturating_add(amount)
    })
}

pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, add_capped)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn total_income(txns: &[CategorizedTransaction]) -> Decimal {
    sum_amounts(txns.iter().filter(|t| t.is_credit()).map(|t| t.amount()))
}

pub fn total_expenses(txns: &[CategorizedTransaction]) -> Decimal {
    sum_amounts(txns.iter().filter(|t| t.is_debit()).map(|t| t.amount()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_savings: Decimal,
    /// Expenses against the fixed reference budget, not the per-category limits.
    pub budget_used_pct: f64,
    pub usage_level: UsageLevel,
}

pub fn get_summary(txns: &[CategorizedTransaction], reference_budget: Decimal) -> Summary {
    let total_income = total_income(txns);
    let total_expenses = total_expenses(txns);
    let budget_used_pct = budget_usage_percent(total_expenses, reference_budget);
    Summary {
        total_income,
        total_expenses,
        net_savings: total_income - total_expenses,
        budget_used_pct,
        usage_level: UsageLevel::from_percent(budget_used_pct),
    }
}

pub fn budget_usage_percent(expenses: Decimal, reference_budget: Decimal) -> f64 {
    to_f64(ratio_percent(expenses, reference_budget))
}

/// Colour band of the overall "budget used" card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    Ok,
    Caution,
    Over,
}

impl UsageLevel {
    pub fn from_percent(pct: f64) -> Self {
        if pct <= 50.0 {
            Self::Ok
        } else if pct <= 80.0 {
            Self::Caution
        } else {
            Self::Over
        }
    }
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub amount: Decimal,
}

/// Stable descending sort, so ties keep their incoming order.
fn take_largest(mut items: Vec<RankedItem>, n: usize) -> Vec<RankedItem> {
    items.sort_by(|a, b| b.amount.cmp(&a.amount));
    items.truncate(n);
    items
}

/// Sum debit amounts per key, in first-encountered key order.
fn group_debits<F>(txns: &[CategorizedTransaction], key: F) -> Vec<RankedItem>
where
    F: Fn(&CategorizedTransaction) -> &str,
{
    let mut groups: Vec<RankedItem> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    for txn in txns.iter().filter(|t| t.is_debit()) {
        let k = key(txn);
        match index.get(k) {
            Some(&i) => groups[i].amount = add_capped(groups[i].amount, txn.amount()),
            None => {
                index.insert(k, groups.len());
                groups.push(RankedItem {
                    name: k.to_string(),
                    amount: txn.amount(),
                });
            }
        }
    }
    groups
}

/// Largest transactions of either direction.
pub fn top_transactions(txns: &[CategorizedTransaction], n: usize) -> Vec<RankedItem> {
    let items = txns
        .iter()
        .map(|t| RankedItem {
            name: t.description().to_string(),
            amount: t.amount(),
        })
        .collect();
    take_largest(items, n)
}

pub fn top_categories(txns: &[CategorizedTransaction], n: usize) -> Vec<RankedItem> {
    take_largest(group_debits(txns, |t| t.category.as_str()), n)
}

/// Merchants are grouped by exact description text.
pub fn top_merchants(txns: &[CategorizedTransaction], n: usize) -> Vec<RankedItem> {
    take_largest(group_debits(txns, |t| t.description()), n)
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

/// Debit totals per category. Categories without debits are absent.
pub fn spending_by_category(txns: &[CategorizedTransaction]) -> BTreeMap<String, Decimal> {
    group_debits(txns, |t| t.category.as_str())
        .into_iter()
        .map(|item| (item.name, item.amount))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    pub pct: f64,
}

pub fn category_breakdown(txns: &[CategorizedTransaction]) -> Vec<CategoryShare> {
    let groups = group_debits(txns, |t| t.category.as_str());
    let total = sum_amounts(groups.iter().map(|g| g.amount));
    groups
        .into_iter()
        .map(|g| CategoryShare {
            pct: to_f64(ratio_percent(g.amount, total)),
            category: g.name,
            total: g.amount,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Budget progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    Warning,
    Exceeded,
}

impl AlertLevel {
    fn from_progress(progress: Decimal) -> Self {
        if progress < Decimal::from(80) {
            Self::Ok
        } else if progress < HUNDRED {
            Self::Warning
        } else {
            Self::Exceeded
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    pub progress_pct: f64,
    /// Never below 1 so an empty bar still shows a sliver.
    pub display_pct: f64,
    pub alert: AlertLevel,
}

impl BudgetProgress {
    pub fn alert_message(&self) -> Option<String> {
        (self.alert == AlertLevel::Exceeded).then(|| {
            format!(
                "Budget exceeded for {}! You've spent ${:.2} (Budget: ${:.2})",
                self.category, self.spent, self.limit
            )
        })
    }
}

/// One entry per budgeted category, in budget order.
pub fn budget_progress(
    spending: &BTreeMap<String, Decimal>,
    budgets: &[CategoryBudget],
) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|b| {
            let spent = spending.get(&b.category).copied().unwrap_or(Decimal::ZERO);
            let progress = ratio_percent(spent, b.limit);
            let progress_pct = to_f64(progress);
            BudgetProgress {
                category: b.category.clone(),
                spent,
                limit: b.limit,
                progress_pct,
                display_pct: progress_pct.max(1.0),
                alert: AlertLevel::from_progress(progress),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Savings goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub term: GoalTerm,
    pub goal: String,
    pub allocated: Decimal,
    pub target: Decimal,
    /// Uncapped; can exceed 100.
    pub progress_pct: f64,
}

/// Project how far `income`, split by `allocations` (percent per goal name),
/// goes toward each goal. Goals without an allocation get 0.
pub fn savings_progress(
    income: Decimal,
    allocations: &BTreeMap<String, Decimal>,
    goals: &[SavingsGoal],
) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|g| {
            let pct = allocations.get(&g.name).copied().unwrap_or(Decimal::ZERO);
            let share = pct / HUNDRED;
            let allocated = income.checked_mul(share).unwrap_or_else(|| {
                warn!("allocation for '{}' overflowed, capped", g.name);
                income.saturating_mul(share)
            });
            GoalProgress {
                term: g.term,
                goal: g.name.clone(),
                allocated,
                target: g.target,
                progress_pct: to_f64(ratio_percent(allocated, g.target)),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
}

impl DailyFlow {
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Credit and debit sums per calendar day, ascending.
pub fn daily_flows(txns: &[CategorizedTransaction]) -> Vec<DailyFlow> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for txn in txns {
        let entry = by_date.entry(txn.date()).or_default();
        if txn.is_credit() {
            entry.0 = add_capped(entry.0, txn.amount());
        } else {
            entry.1 = add_capped(entry.1, txn.amount());
        }
    }
    by_date
        .into_iter()
        .map(|(date, (income, expenses))| DailyFlow {
            date,
            income,
            expenses,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsPoint {
    pub date: NaiveDate,
    pub net: Decimal,
    pub cumulative: Decimal,
}

pub fn cumulative_savings(txns: &[CategorizedTransaction]) -> Vec<SavingsPoint> {
    let mut running = Decimal::ZERO;
    daily_flows(txns)
        .into_iter()
        .map(|day| {
            let net = day.net();
            running = add_capped(running, net);
            SavingsPoint {
                date: day.date,
                net,
                cumulative: running,
            }
        })
        .collect()
}
