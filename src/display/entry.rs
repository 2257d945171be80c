//! Budget entry display formatting
//!
//! Renders ledger entries as a list in the app's sign convention:
//! income with `+`, expenses and savings with `-`.

use super::currency::format_signed;
use crate::models::BudgetEntry;

const NAME_WIDTH: usize = 24;
const CATEGORY_WIDTH: usize = 16;

/// Format a single entry as one list row
pub fn format_entry_row(entry: &BudgetEntry, currency_code: &str) -> String {
    let recurring = if entry.is_recurring { "↻" } else { " " };
    let category = if entry.category.is_empty() {
        "-"
    } else {
        entry.category.as_str()
    };

    format!(
        "{} {:<w_name$} {:<w_cat$} {:<8} {:>14}",
        recurring,
        truncate(&entry.name, NAME_WIDTH),
        truncate(category, CATEGORY_WIDTH),
        entry.entry_type.as_str(),
        format_signed(entry.amount, entry.entry_type, currency_code),
        w_name = NAME_WIDTH,
        w_cat = CATEGORY_WIDTH,
    )
}

/// Format a list of entries with a header
pub fn format_entry_list(entries: &[BudgetEntry], currency_code: &str) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "  {:<w_name$} {:<w_cat$} {:<8} {:>14}\n",
        "Name",
        "Category",
        "Type",
        "Amount",
        w_name = NAME_WIDTH,
        w_cat = CATEGORY_WIDTH,
    ));
    output.push_str(&"-".repeat(NAME_WIDTH + CATEGORY_WIDTH + 27));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_entry_row(entry, currency_code));
        output.push('\n');
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetEntryInput, EntryType, Money, UserId};

    fn entry(name: &str, cents: i64, entry_type: EntryType) -> BudgetEntry {
        BudgetEntry::new(
            UserId::new(),
            BudgetEntryInput::new(name, Money::from_cents(cents), "Housing", entry_type),
        )
    }

    #[test]
    fn test_row_signs() {
        let income = format_entry_row(&entry("Salary", 500_000, EntryType::Income), "USD");
        assert!(income.contains("+$5,000.00"));

        let rent = format_entry_row(&entry("Rent", 150_000, EntryType::Expense), "USD");
        assert!(rent.contains("-$1,500.00"));
        assert!(rent.contains("expense"));
    }

    #[test]
    fn test_recurring_marker() {
        let mut rent = entry("Rent", 150_000, EntryType::Expense);
        rent.is_recurring = true;
        assert!(format_entry_row(&rent, "USD").starts_with('↻'));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_entry_list(&[], "USD"), "No entries found.\n");
    }

    #[test]
    fn test_long_names_truncated() {
        let long = entry(&"x".repeat(40), 100, EntryType::Expense);
        let row = format_entry_row(&long, "USD");
        assert!(row.contains(&format!("{}...", "x".repeat(NAME_WIDTH - 3))));
        assert!(!row.contains(&"x".repeat(NAME_WIDTH + 1)));
    }
}
