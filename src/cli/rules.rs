use comfy_table::{Cell, Table};

use crate::categorizer::{CategorizeResult, Categorizer};
use crate::error::Result;
use crate::models::UNCATEGORIZED;

use super::Context;

pub fn list(ctx: &Context) -> Result<()> {
    let result = ctx.categorizer.rule_hits(&ctx.inputs.transactions);
    println!("{}", format_rules(&ctx.categorizer, &result));
    if ctx.categorizer.rules().is_empty() {
        println!(
            "No merchant rules loaded from {}. Every transaction is {UNCATEGORIZED}.",
            ctx.settings.rules_path().display()
        );
    }
    Ok(())
}

pub fn format_rules(categorizer: &Categorizer, result: &CategorizeResult) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Merchant", "Category", "Hits"]);
    for (i, (rule, hits)) in categorizer.rules().iter().zip(&result.hits).enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.merchant_substring),
            Cell::new(&rule.category),
            Cell::new(hits),
        ]);
    }
    format!(
        "Merchant Rules (first match wins)\n{table}\nCategorized: {}  {UNCATEGORIZED}: {}",
        result.categorized(),
        result.uncategorized
    )
}
