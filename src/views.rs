//! Per-view data, computed fresh from the categorized table on every request.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CategorizedTransaction, CategoryBudget, SavingsGoal};
use crate::reports::{
    self, BudgetProgress, CategoryShare, DailyFlow, GoalProgress, RankedItem, SavingsPoint, Summary,
};
use crate::settings::Settings;

/// Everything the aggregations read. Immutable for the life of a request.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub transactions: Vec<CategorizedTransaction>,
    pub reference_budget: Decimal,
    pub budgets: Vec<CategoryBudget>,
    pub savings_goals: Vec<SavingsGoal>,
    pub allocations: BTreeMap<String, Decimal>,
    pub savings_income: Option<Decimal>,
    pub top_n: usize,
}

impl Inputs {
    pub fn new(settings: &Settings, transactions: Vec<CategorizedTransaction>) -> Self {
        Self {
            transactions,
            reference_budget: settings.reference_budget,
            budgets: settings.budgets.clone(),
            savings_goals: settings.savings_goals.clone(),
            allocations: settings.allocations.clone(),
            savings_income: settings.savings_income,
            top_n: settings.top_n,
        }
    }

    /// Configured projection income, else the table's total income.
    pub fn savings_income(&self) -> Decimal {
        self.savings_income
            .unwrap_or_else(|| reports::total_income(&self.transactions))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    BudgetTracker,
}

impl View {
    pub const ALL: [View; 2] = [View::Dashboard, View::BudgetTracker];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::BudgetTracker => "Budget Tracker",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Dashboard => Self::BudgetTracker,
            Self::BudgetTracker => Self::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub summary: Summary,
    pub daily_flows: Vec<DailyFlow>,
    pub breakdown: Vec<CategoryShare>,
    pub top_transactions: Vec<RankedItem>,
    pub top_categories: Vec<RankedItem>,
    pub top_merchants: Vec<RankedItem>,
    pub savings_trend: Vec<SavingsPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetTrackerData {
    pub budgets: Vec<BudgetProgress>,
    pub alerts: Vec<String>,
    pub savings_income: Decimal,
    pub savings: Vec<GoalProgress>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Dashboard(DashboardData),
    BudgetTracker(BudgetTrackerData),
}

pub fn dashboard(inputs: &Inputs) -> DashboardData {
    let txns = &inputs.transactions;
    DashboardData {
        summary: reports::get_summary(txns, inputs.reference_budget),
        daily_flows: reports::daily_flows(txns),
        breakdown: reports::category_breakdown(txns),
        top_transactions: reports::top_transactions(txns, inputs.top_n),
        top_categories: reports::top_categories(txns, inputs.top_n),
        top_merchants: reports::top_merchants(txns, inputs.top_n),
        savings_trend: reports::cumulative_savings(txns),
    }
}

pub fn budget_tracker(inputs: &Inputs) -> BudgetTrackerData {
    let spending = reports::spending_by_category(&inputs.transactions);
    let budgets = reports::budget_progress(&spending, &inputs.budgets);
    let alerts = budgets.iter().filter_map(|b| b.alert_message()).collect();
    let savings_income = inputs.savings_income();
    let savings = reports::savings_progress(savings_income, &inputs.allocations, &inputs.savings_goals);
    BudgetTrackerData {
        budgets,
        alerts,
        savings_income,
        savings,
    }
}

pub fn build(view: View, inputs: &Inputs) -> ViewData {
    match view {
        View::Dashboard => ViewData::Dashboard(dashboard(inputs)),
        View::BudgetTracker => ViewData::BudgetTracker(budget_tracker(inputs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::Categorizer;
    use crate::models::{CategoryRule, Transaction, TransactionType};
    use chrono::NaiveDate;

    fn inputs() -> Inputs {
        let categorizer = Categorizer::new(vec![
            CategoryRule::new("Starbucks", "Food"),
            CategoryRule::new("Landlord", "Housing"),
            CategoryRule::new("Payroll", "Income"),
        ]);
        let raw = [
            ("2024-09-01", "ACME PAYROLL", "4000", TransactionType::Credit),
            ("2024-09-01", "LANDLORD LLC", "1300", TransactionType::Debit),
            ("2024-09-02", "STARBUCKS 12", "6.40", TransactionType::Debit),
            ("2024-09-03", "KIOSK", "3.00", TransactionType::Debit),
        ];
        let txns = raw
            .iter()
            .map(|(date, desc, amount, kind)| Transaction {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                description: desc.to_string(),
                amount: amount.parse().unwrap(),
                transaction_type: *kind,
            })
            .collect();
        Inputs::new(&Settings::default(), categorizer.categorize_all(txns))
    }

    #[test]
    fn test_dashboard_view() {
        let ViewData::Dashboard(data) = build(View::Dashboard, &inputs()) else {
            panic!("expected dashboard data");
        };
        assert_eq!(data.summary.total_income, Decimal::from(4000));
        assert_eq!(data.top_categories[0].name, "Housing");
        assert!(data.top_categories.iter().any(|c| c.name == "Uncategorized"));
        assert_eq!(data.savings_trend.len(), 3);
    }

    #[test]
    fn test_budget_tracker_view() {
        let data = budget_tracker(&inputs());
        assert_eq!(data.budgets.len(), 6);
        assert_eq!(data.alerts.len(), 1);
        assert!(data.alerts[0].starts_with("Budget exceeded for Housing!"));
        assert_eq!(data.savings_income, Decimal::from(4000));
        let vacation = data.savings.iter().find(|g| g.goal == "Vacation").unwrap();
        assert_eq!(vacation.allocated, Decimal::from(400));
    }

    #[test]
    fn test_configured_savings_income_wins() {
        let mut i = inputs();
        i.savings_income = Some(Decimal::from(5000));
        let data = budget_tracker(&i);
        let vacation = data.savings.iter().find(|g| g.goal == "Vacation").unwrap();
        assert!((vacation.progress_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dashboard.next(), View::BudgetTracker);
        assert_eq!(View::BudgetTracker.next(), View::Dashboard);
    }
}
