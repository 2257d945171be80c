//! Format CLI command

use clap::Args;

use crate::config::settings::Settings;
use crate::display::currency;
use crate::error::BudgetResult;

/// Arguments of `budgetwise format`
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Amount to format (e.g. 1234.5)
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,

    /// Currency code (defaults to the configured currency)
    #[arg(short, long)]
    pub currency: Option<String>,
}

/// Handle `budgetwise format`
pub fn handle_format_command(settings: &Settings, args: FormatArgs) -> BudgetResult<()> {
    let code = args.currency.as_deref().unwrap_or(&settings.currency_code);
    println!("{}", currency::format(args.amount, code)?);
    Ok(())
}
