//! Budget analysis display formatting
//!
//! Renders a [`BudgetAnalysis`] as a terminal report: totals, balance
//! health, the 50/30/20 table and spending per category.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::currency::format_money;
use super::report::{format_bar, format_percentage, separator};
use crate::analysis::BudgetAnalysis;

const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Usage")]
    bar: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Spent")]
    spent: String,
}

/// Format the full analysis report
pub fn format_analysis(analysis: &BudgetAnalysis, currency_code: &str) -> String {
    let mut output = String::new();

    output.push_str("Budget Summary\n");
    output.push_str(&separator(40));
    output.push('\n');
    output.push_str(&format!(
        "{:<16}{:>24}\n",
        "Income",
        format_money(analysis.total_income, currency_code)
    ));
    output.push_str(&format!(
        "{:<16}{:>24}\n",
        "Expenses",
        format_money(analysis.total_expenses, currency_code)
    ));
    output.push_str(&format!(
        "{:<16}{:>24}\n",
        "Savings",
        format_money(analysis.total_savings, currency_code)
    ));

    let remaining = if analysis.remaining.is_negative() {
        format!("-{}", format_money(analysis.remaining, currency_code))
    } else {
        format_money(analysis.remaining, currency_code)
    };
    output.push_str(&format!("{:<16}{:>24}\n", "Remaining", remaining));
    output.push_str(&format!(
        "{:<16}{:>24}\n\n",
        "Status",
        if analysis.budget_healthy {
            "On track"
        } else {
            "Over budget"
        }
    ));

    output.push_str("50/30/20 Allocation\n");
    output.push_str(&format_bucket_table(analysis, currency_code));
    output.push('\n');

    if !analysis.fully_classified() {
        output.push_str(&format!(
            "Unclassified expenses: {}\n",
            format_money(analysis.unclassified_expenses, currency_code)
        ));
    }

    if !analysis.category_totals.is_empty() {
        output.push_str("\nSpending by Category\n");
        output.push_str(&format_category_table(analysis, currency_code));
        output.push('\n');
    }

    output
}

/// Format the 50/30/20 table
pub fn format_bucket_table(analysis: &BudgetAnalysis, currency_code: &str) -> String {
    let rows: Vec<BucketRow> = analysis
        .buckets()
        .into_iter()
        .map(|summary| BucketRow {
            bucket: format!("{} ({}%)", summary.bucket, summary.bucket.target_percent()),
            target: format_money(summary.target, currency_code),
            spent: format_money(summary.spent, currency_code),
            progress: format_percentage(summary.progress()),
            bar: format_bar(summary.progress(), BAR_WIDTH),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Format expense spending per category, largest first
pub fn format_category_table(analysis: &BudgetAnalysis, currency_code: &str) -> String {
    let mut totals: Vec<_> = analysis.category_totals.iter().collect();
    totals.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    let rows: Vec<CategoryRow> = totals
        .into_iter()
        .map(|(category, spent)| CategoryRow {
            category: category.clone(),
            spent: format_money(*spent, currency_code),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
