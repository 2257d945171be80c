//! Budget analysis engine
//!
//! Derives income, expense and savings totals and the 50/30/20 allocation
//! from a ledger snapshot. The computation is pure: no I/O, no shared state.
//!
//! Amounts are summed as integer cents in a single left-to-right fold, so
//! the result is exact and does not depend on the order of the entries.
//! Running the analysis twice over the same snapshot yields equal values.
//!
//! # Example
//!
//! ```
//! use budgetwise::analysis::analyze;
//! use budgetwise::models::{BudgetEntry, BudgetEntryInput, CategoryMap, EntryType, Money, UserId};
//!
//! let user = UserId::new();
//! let entries = vec![
//!     BudgetEntry::new(user, BudgetEntryInput::new("Salary", Money::from_cents(350_000), "Salary", EntryType::Income)),
//!     BudgetEntry::new(user, BudgetEntryInput::new("Rent", Money::from_cents(120_000), "Housing", EntryType::Expense)),
//! ];
//!
//! let analysis = analyze(&entries, &CategoryMap::default());
//! assert_eq!(analysis.remaining, Money::from_cents(230_000));
//! assert!(analysis.budget_healthy);
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{BudgetEntry, Bucket, CategoryMap, EntryType, Money};

/// Label used in `category_totals` for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Derived figures for one ledger snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetAnalysis {
    /// Sum of income entries
    pub total_income: Money,
    /// Sum of expense entries (classified or not)
    pub total_expenses: Money,
    /// Sum of savings entries
    pub total_savings: Money,
    /// `total_income - total_expenses - total_savings`; may be negative
    pub remaining: Money,
    /// `remaining >= 0`
    pub budget_healthy: bool,

    /// 50% of income
    pub needs_target: Money,
    /// 30% of income
    pub wants_target: Money,
    /// 20% of income
    pub savings_target: Money,

    /// Expenses in Needs categories
    pub needs_spent: Money,
    /// Expenses in Wants categories
    pub wants_spent: Money,
    /// Savings entries, plus legacy savings expenses when configured
    pub savings_spent: Money,
    /// Expenses counted in no bucket
    pub unclassified_expenses: Money,

    /// Expense spending per category label
    pub category_totals: BTreeMap<String, Money>,
    /// Number of entries analyzed
    pub entry_count: usize,
}

/// Target and spending of one 50/30/20 bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSummary {
    pub bucket: Bucket,
    pub target: Money,
    pub spent: Money,
}

impl BucketSummary {
    /// Percent of the target already spent; 0 when the target is 0
    pub fn progress(&self) -> f64 {
        self.spent.percentage_of(self.target)
    }

    /// Target left to spend; negative when over target
    pub fn remaining(&self) -> Money {
        self.target - self.spent
    }

    pub fn is_over_target(&self) -> bool {
        self.spent > self.target
    }
}

impl BudgetAnalysis {
    /// Summary of one bucket
    pub fn bucket(&self, bucket: Bucket) -> BucketSummary {
        let (target, spent) = match bucket {
            Bucket::Needs => (self.needs_target, self.needs_spent),
            Bucket::Wants => (self.wants_target, self.wants_spent),
            Bucket::Savings => (self.savings_target, self.savings_spent),
        };
        BucketSummary {
            bucket,
            target,
            spent,
        }
    }

    /// Summaries of all three buckets in display order
    pub fn buckets(&self) -> Vec<BucketSummary> {
        Bucket::all().iter().map(|b| self.bucket(*b)).collect()
    }

    pub fn needs_progress(&self) -> f64 {
        self.bucket(Bucket::Needs).progress()
    }

    pub fn wants_progress(&self) -> f64 {
        self.bucket(Bucket::Wants).progress()
    }

    pub fn savings_progress(&self) -> f64 {
        self.bucket(Bucket::Savings).progress()
    }

    /// Percent of income put into savings; 0 when there is no income
    pub fn savings_rate(&self) -> f64 {
        self.total_savings.percentage_of(self.total_income)
    }

    /// Whether every expense landed in a bucket
    pub fn fully_classified(&self) -> bool {
        self.unclassified_expenses.is_zero()
    }
}

/// Analyze a ledger snapshot against a category taxonomy
///
/// The engine trusts its input: entries are validated by the ledger store
/// before they get here.
pub fn analyze(snapshot: &[BudgetEntry], categories: &CategoryMap) -> BudgetAnalysis {
    let mut total_income = Money::zero();
    let mut total_expenses = Money::zero();
    let mut total_savings = Money::zero();
    let mut needs_spent = Money::zero();
    let mut wants_spent = Money::zero();
    let mut savings_spent = Money::zero();
    let mut unclassified_expenses = Money::zero();
    let mut category_totals: BTreeMap<String, Money> = BTreeMap::new();

    for entry in snapshot {
        match entry.entry_type {
            EntryType::Income => total_income += entry.amount,
            EntryType::Savings => {
                total_savings += entry.amount;
                savings_spent += entry.amount;
            }
            EntryType::Expense => {
                total_expenses += entry.amount;
                *category_totals
                    .entry(category_label(&entry.category))
                    .or_default() += entry.amount;

                match categories.classify(&entry.category) {
                    Some(Bucket::Needs) => needs_spent += entry.amount,
                    Some(Bucket::Wants) => wants_spent += entry.amount,
                    _ if categories.is_legacy_savings(&entry.category) => {
                        savings_spent += entry.amount
                    }
                    _ => unclassified_expenses += entry.amount,
                }
            }
        }
    }

    let remaining = total_income - total_expenses - total_savings;

    BudgetAnalysis {
        total_income,
        total_expenses,
        total_savings,
        remaining,
        budget_healthy: !remaining.is_negative(),
        needs_target: total_income.percent(Bucket::Needs.target_percent()),
        wants_target: total_income.percent(Bucket::Wants.target_percent()),
        savings_target: total_income.percent(Bucket::Savings.target_percent()),
        needs_spent,
        wants_spent,
        savings_spent,
        unclassified_expenses,
        category_totals,
        entry_count: snapshot.len(),
    }
}

fn category_label(category: &str) -> String {
    let category = category.trim();
    if category.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        category.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetEntryInput, UserId};

    fn entry(amount: i64, category: &str, entry_type: EntryType) -> BudgetEntry {
        BudgetEntry::new(
            UserId::new(),
            BudgetEntryInput::new(category, Money::from_cents(amount * 100), category, entry_type),
        )
    }

    fn sample() -> Vec<BudgetEntry> {
        vec![
            entry(3500, "Salary", EntryType::Income),
            entry(1200, "Housing", EntryType::Expense),
            entry(400, "Food", EntryType::Expense),
            entry(200, "Lifestyle", EntryType::Expense),
        ]
    }

    fn units(n: i64) -> Money {
        Money::from_cents(n * 100)
    }

    #[test]
    fn test_worked_example() {
        let analysis = analyze(&sample(), &CategoryMap::default());

        assert_eq!(analysis.total_income, units(3500));
        assert_eq!(analysis.total_expenses, units(1800));
        assert_eq!(analysis.total_savings, Money::zero());
        assert_eq!(analysis.remaining, units(1700));
        assert!(analysis.budget_healthy);
        assert_eq!(analysis.needs_spent, units(1600));
        assert_eq!(analysis.wants_spent, units(200));
        assert_eq!(analysis.needs_target, units(1750));
        assert_eq!(analysis.wants_target, units(1050));
        assert_eq!(analysis.savings_target, units(700));
        assert_eq!(analysis.entry_count, 4);
        assert!(analysis.fully_classified());
    }

    #[test]
    fn test_empty_snapshot() {
        let analysis = analyze(&[], &CategoryMap::default());

        assert_eq!(analysis.total_income, Money::zero());
        assert_eq!(analysis.total_expenses, Money::zero());
        assert_eq!(analysis.total_savings, Money::zero());
        assert_eq!(analysis.remaining, Money::zero());
        assert!(analysis.budget_healthy);
        assert!(analysis.category_totals.is_empty());
        assert_eq!(analysis.entry_count, 0);
    }

    #[test]
    fn test_zero_income_targets_and_ratios() {
        let snapshot = vec![
            entry(50, "Housing", EntryType::Expense),
            entry(25, "Emergency fund", EntryType::Savings),
        ];
        let analysis = analyze(&snapshot, &CategoryMap::default());

        assert_eq!(analysis.needs_target, Money::zero());
        assert_eq!(analysis.wants_target, Money::zero());
        assert_eq!(analysis.savings_target, Money::zero());
        for summary in analysis.buckets() {
            assert_eq!(summary.progress(), 0.0);
        }
        assert_eq!(analysis.savings_rate(), 0.0);
        assert!(!analysis.budget_healthy);
        assert_eq!(analysis.remaining, units(-75));
    }

    #[test]
    fn test_unclassified_expense_stays_in_total() {
        let mut snapshot = sample();
        snapshot.push(entry(300, "Gifts", EntryType::Expense));
        let analysis = analyze(&snapshot, &CategoryMap::default());

        assert_eq!(analysis.total_expenses, units(2100));
        assert_eq!(analysis.unclassified_expenses, units(300));
        assert!(analysis.total_expenses > analysis.needs_spent + analysis.wants_spent);
        assert!(!analysis.fully_classified());
    }

    #[test]
    fn test_buckets_never_exceed_total_expenses() {
        let taxonomies = [
            CategoryMap::default(),
            CategoryMap::empty(),
            CategoryMap::new(["Housing"], ["Gifts"]),
        ];
        let mut snapshot = sample();
        snapshot.push(entry(300, "Gifts", EntryType::Expense));
        snapshot.push(entry(90, "", EntryType::Expense));

        for map in &taxonomies {
            let a = analyze(&snapshot, map);
            assert!(a.total_expenses >= a.needs_spent + a.wants_spent);
            assert_eq!(
                a.total_expenses,
                a.needs_spent + a.wants_spent + a.unclassified_expenses
            );
        }
    }

    #[test]
    fn test_remaining_identity_with_savings() {
        let mut snapshot = sample();
        snapshot.push(entry(500, "Emergency fund", EntryType::Savings));
        let a = analyze(&snapshot, &CategoryMap::default());

        assert_eq!(a.total_savings, units(500));
        assert_eq!(a.savings_spent, units(500));
        assert_eq!(a.remaining, a.total_income - a.total_expenses - a.total_savings);
        assert_eq!(a.remaining, units(1200));
        assert_eq!(a.savings_progress(), 500.0 / 700.0 * 100.0);
    }

    #[test]
    fn test_entries_at_amount_limit_sum_exactly() {
        let at_limit = |category: &str, entry_type| {
            BudgetEntry::new(
                UserId::new(),
                BudgetEntryInput::new(category, Money::MAX_AMOUNT, category, entry_type),
            )
        };
        let entries: Vec<BudgetEntry> = (0..1000)
            .map(|_| at_limit("Salary", EntryType::Income))
            .chain([at_limit("Housing", EntryType::Expense)])
            .collect();
        assert!(entries.iter().all(|e| e.to_input().validate().is_ok()));

        let analysis = analyze(&entries, &CategoryMap::default());
        assert_eq!(analysis.total_income.cents(), 1000 * Money::MAX_AMOUNT.cents());
        assert_eq!(analysis.needs_spent, Money::MAX_AMOUNT);
        assert_eq!(
            analysis.remaining.cents(),
            999 * Money::MAX_AMOUNT.cents()
        );
        assert!(analysis.budget_healthy);
    }

    #[test]
    fn test_totals_saturate_instead_of_wrapping() {
        let huge = |entry_type| {
            BudgetEntry::new(
                UserId::new(),
                BudgetEntryInput::new("Big", Money::from_cents(i64::MAX / 2 + 1), "Housing", entry_type),
            )
        };
        let entries = vec![
            huge(EntryType::Income),
            huge(EntryType::Income),
            huge(EntryType::Expense),
            huge(EntryType::Expense),
            huge(EntryType::Savings),
        ];

        let analysis = analyze(&entries, &CategoryMap::default());
        assert_eq!(analysis.total_income.cents(), i64::MAX);
        assert_eq!(analysis.total_expenses.cents(), i64::MAX);
        assert!(!analysis.total_income.is_negative());
        assert!(analysis.remaining.is_negative());
        assert!(!analysis.budget_healthy);
        assert!(analysis.needs_spent <= analysis.total_expenses);
    }

    #[test]
    fn test_idempotent() {
        let snapshot = sample();
        let map = CategoryMap::default();
        assert_eq!(analyze(&snapshot, &map), analyze(&snapshot, &map));
    }

    #[test]
    fn test_order_independent() {
        let mut snapshot = sample();
        snapshot.push(entry(300, "Gifts", EntryType::Expense));
        snapshot.push(entry(150, "Retirement", EntryType::Savings));
        let map = CategoryMap::default();
        let expected = analyze(&snapshot, &map);

        let mut reversed = snapshot.clone();
        reversed.reverse();
        assert_eq!(analyze(&reversed, &map), expected);

        for shift in 1..snapshot.len() {
            let mut rotated = snapshot.clone();
            rotated.rotate_left(shift);
            assert_eq!(analyze(&rotated, &map), expected);
        }
    }

    #[test]
    fn test_legacy_savings_expense() {
        let mut snapshot = sample();
        snapshot.push(entry(100, "Savings", EntryType::Expense));

        let canonical = analyze(&snapshot, &CategoryMap::default());
        assert_eq!(canonical.savings_spent, Money::zero());
        assert_eq!(canonical.unclassified_expenses, units(100));

        let legacy = analyze(&snapshot, &CategoryMap::default().with_legacy_savings("Savings"));
        assert_eq!(legacy.savings_spent, units(100));
        assert_eq!(legacy.unclassified_expenses, Money::zero());
        // Still an expense, never double-counted as savings
        assert_eq!(legacy.total_expenses, units(1900));
        assert_eq!(legacy.total_savings, Money::zero());
        assert_eq!(legacy.remaining, canonical.remaining);
    }

    #[test]
    fn test_category_totals() {
        let mut snapshot = sample();
        snapshot.push(entry(50, "Food", EntryType::Expense));
        snapshot.push(entry(10, "  ", EntryType::Expense));
        let a = analyze(&snapshot, &CategoryMap::default());

        assert_eq!(a.category_totals.get("Food"), Some(&units(450)));
        assert_eq!(a.category_totals.get("Housing"), Some(&units(1200)));
        assert_eq!(a.category_totals.get(UNCATEGORIZED), Some(&units(10)));
        assert!(!a.category_totals.contains_key("Salary"));
    }

    #[test]
    fn test_recurring_flag_does_not_affect_totals() {
        let plain = sample();
        let recurring: Vec<_> = plain
            .iter()
            .cloned()
            .map(|mut e| {
                e.is_recurring = true;
                e
            })
            .collect();
        let map = CategoryMap::default();
        assert_eq!(analyze(&plain, &map), analyze(&recurring, &map));
    }

    #[test]
    fn test_bucket_summary() {
        let a = analyze(&sample(), &CategoryMap::default());
        let needs = a.bucket(Bucket::Needs);
        assert_eq!(needs.remaining(), units(150));
        assert!(!needs.is_over_target());
        assert_eq!(a.wants_progress(), 200.0 / 1050.0 * 100.0);
    }
}
