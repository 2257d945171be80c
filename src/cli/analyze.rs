//! Analyze CLI command
//!
//! Loads a ledger file and prints the 50/30/20 analysis.

use std::path::PathBuf;

use clap::Args;

use crate::analysis::analyze;
use crate::config::settings::Settings;
use crate::display::{format_analysis, format_entry_list};
use crate::error::BudgetResult;
use crate::models::category::LEGACY_SAVINGS_CATEGORY;
use crate::models::UserId;
use crate::storage::{load_entries, LedgerStore};

/// Arguments of `budgetwise analyze`
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Ledger file (.json or .csv)
    pub file: PathBuf,

    /// Currency code for display (defaults to the configured currency)
    #[arg(short, long)]
    pub currency: Option<String>,

    /// Also list the entries
    #[arg(short, long)]
    pub entries: bool,

    /// Count expenses in the "Savings" category as savings
    #[arg(long)]
    pub legacy_savings: bool,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle `budgetwise analyze`
pub fn handle_analyze_command(settings: &Settings, args: AnalyzeArgs) -> BudgetResult<()> {
    let user = UserId::new();
    let ledger = LedgerStore::new(user);
    ledger.replace_all(load_entries(&args.file, user)?)?;
    let snapshot = ledger.all()?;

    let mut categories = settings.categories.clone();
    if args.legacy_savings && categories.legacy_savings_category.is_none() {
        categories = categories.with_legacy_savings(LEGACY_SAVINGS_CATEGORY);
    }

    let analysis = analyze(&snapshot, &categories);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let currency = args.currency.as_deref().unwrap_or(&settings.currency_code);
    if args.entries {
        println!("Entries");
        print!("{}", format_entry_list(&snapshot, currency));
        println!();
    }
    print!("{}", format_analysis(&analysis, currency));

    Ok(())
}
