use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::fmt::{money, percent};
use crate::models::CategorizedTransaction;
use crate::reports::{
    self, AlertLevel, BudgetProgress, CategoryShare, DailyFlow, GoalProgress, RankedItem,
    SavingsPoint, Summary, UsageLevel,
};
use crate::views;

use super::Context;

// ---------------------------------------------------------------------------
// Command wrappers
// ---------------------------------------------------------------------------

pub fn summary(ctx: &Context) -> Result<()> {
    let data = reports::get_summary(&ctx.inputs.transactions, ctx.inputs.reference_budget);
    println!("{}", format_summary(&data, ctx.inputs.reference_budget));
    Ok(())
}

pub fn top(ctx: &Context, n: Option<usize>) -> Result<()> {
    let n = n.unwrap_or(ctx.inputs.top_n);
    let txns = &ctx.inputs.transactions;
    let sections = [
        ("Transactions", "Description", reports::top_transactions(txns, n)),
        ("Categories", "Category", reports::top_categories(txns, n)),
        ("Merchants", "Merchant", reports::top_merchants(txns, n)),
    ];
    let blocks: Vec<String> = sections
        .iter()
        .map(|(title, label, items)| format_ranked(&format!("Top {n} {title}"), label, items))
        .collect();
    println!("{}", blocks.join("\n\n"));
    Ok(())
}

pub fn categories(ctx: &Context) -> Result<()> {
    let data = reports::category_breakdown(&ctx.inputs.transactions);
    println!("{}", format_breakdown(&data));
    Ok(())
}

pub fn budget(ctx: &Context) -> Result<()> {
    let data = views::budget_tracker(&ctx.inputs);
    println!("{}", format_budget(&data.budgets));
    Ok(())
}

pub fn savings(ctx: &Context, income: Option<Decimal>) -> Result<()> {
    let income = income.unwrap_or_else(|| ctx.inputs.savings_income());
    let data = reports::savings_progress(income, &ctx.inputs.allocations, &ctx.inputs.savings_goals);
    println!("{}", format_savings(income, &data));
    Ok(())
}

pub fn trend(ctx: &Context) -> Result<()> {
    let txns = &ctx.inputs.transactions;
    println!(
        "{}",
        format_trend(&reports::daily_flows(txns), &reports::cumulative_savings(txns))
    );
    Ok(())
}

pub fn transactions(ctx: &Context) -> Result<()> {
    if ctx.inputs.transactions.is_empty() {
        println!("No transactions in {}", ctx.transactions_path.display());
        return Ok(());
    }
    println!("{}", format_transactions(&ctx.inputs.transactions));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

fn usage_label(level: UsageLevel, pct: f64) -> String {
    let text = percent(pct);
    match level {
        UsageLevel::Ok => text.green().to_string(),
        UsageLevel::Caution => text.yellow().to_string(),
        UsageLevel::Over => text.red().to_string(),
    }
}

pub fn format_summary(s: &Summary, reference_budget: Decimal) -> String {
    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Total Income"), Cell::new(money(s.total_income))]);
    table.add_row(vec![Cell::new("Expenses"), Cell::new(money(s.total_expenses))]);
    let net_label = if s.net_savings >= Decimal::ZERO {
        "Savings".green().bold()
    } else {
        "Savings".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(s.net_savings))]);
    table.add_row(vec![
        Cell::new(format!("Budget Used (of {})", money(reference_budget))),
        Cell::new(usage_label(s.usage_level, s.budget_used_pct)),
    ]);
    format!("Summary\n{table}")
}

pub fn format_ranked(title: &str, label: &str, items: &[RankedItem]) -> String {
    let mut table = Table::new();
    table.set_header(vec![label, "Amount"]);
    for item in items {
        table.add_row(vec![Cell::new(&item.name), Cell::new(money(item.amount))]);
    }
    format!("{title}\n{table}")
}

pub fn format_breakdown(items: &[CategoryShare]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%"]);
    let total = reports::sum_amounts(items.iter().map(|i| i.total));
    for item in items {
        table.add_row(vec![
            Cell::new(&item.category),
            Cell::new(money(item.total)),
            Cell::new(percent(item.pct)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(total)),
        Cell::new(""),
    ]);
    format!("Expense Breakdown by Category\n{table}")
}

pub fn format_budget(items: &[BudgetProgress]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Spent", "Budget", "Used", "Status"]);
    for b in items {
        let status = match b.alert {
            AlertLevel::Ok => "ok".green(),
            AlertLevel::Warning => "warning".yellow(),
            AlertLevel::Exceeded => "exceeded".red().bold(),
        };
        table.add_row(vec![
            Cell::new(&b.category),
            Cell::new(money(b.spent)),
            Cell::new(money(b.limit)),
            Cell::new(percent(b.progress_pct)),
            Cell::new(status),
        ]);
    }
    let mut out = format!("Budget Tracking\n{table}");
    for alert in items.iter().filter_map(BudgetProgress::alert_message) {
        out.push('\n');
        out.push_str(&alert.red().to_string());
    }
    out
}

pub fn format_savings(income: Decimal, items: &[GoalProgress]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Term", "Goal", "Allocated", "Target", "Progress"]);
    for g in items {
        table.add_row(vec![
            Cell::new(g.term.label()),
            Cell::new(&g.goal),
            Cell::new(money(g.allocated)),
            Cell::new(money(g.target)),
            Cell::new(percent(g.progress_pct)),
        ]);
    }
    format!("Savings Goals Progress (income {})\n{table}", money(income))
}

pub fn format_trend(flows: &[DailyFlow], series: &[SavingsPoint]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Income", "Expenses", "Net", "Cumulative"]);
    for (flow, point) in flows.iter().zip(series) {
        table.add_row(vec![
            Cell::new(flow.date),
            Cell::new(money(flow.income)),
            Cell::new(money(flow.expenses)),
            Cell::new(money(point.net)),
            Cell::new(money(point.cumulative)),
        ]);
    }
    format!("Cumulative Savings Over Time\n{table}")
}

pub fn format_transactions(txns: &[CategorizedTransaction]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Type", "Category"]);
    for t in txns {
        table.add_row(vec![
            Cell::new(t.date()),
            Cell::new(t.description()),
            Cell::new(money(t.amount())),
            Cell::new(t.transaction.transaction_type),
            Cell::new(&t.category),
        ]);
    }
    format!("Transaction Details ({})\n{table}", txns.len())
}
