//! Currency formatting
//!
//! Renders amounts for display in the user's preferred currency. The
//! formatter always works on the absolute value; prepending a sign based on
//! the entry type is up to the caller (see [`format_signed`]).

use std::borrow::Cow;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{EntryType, Money};

/// Currency code used when the user has not picked one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Display prefix for a currency code
///
/// Only `USD` maps to a symbol; any other code is shown as itself followed
/// by a space.
pub fn currency_symbol(currency_code: &str) -> Cow<'static, str> {
    let code = currency_code.trim();
    if code.eq_ignore_ascii_case("USD") {
        Cow::Borrowed("$")
    } else if code.is_empty() {
        Cow::Borrowed("")
    } else {
        Cow::Owned(format!("{} ", code.to_ascii_uppercase()))
    }
}

/// Format a decimal amount, e.g. `format(1234.5, "USD") == "$1,234.50"`
///
/// Any finite amount can be formatted, including ones too large for
/// [`Money`].
///
/// # Errors
///
/// Returns [`BudgetError::UnsupportedFormat`] when `amount` is NaN or
/// infinite.
pub fn format(amount: f64, currency_code: &str) -> BudgetResult<String> {
    if !amount.is_finite() {
        return Err(BudgetError::UnsupportedFormat(format!(
            "cannot format non-finite amount {}",
            amount
        )));
    }

    let amount = amount.abs();
    let mut whole = amount.trunc();
    let mut cents = ((amount - whole) * 100.0).round();
    if cents >= 100.0 {
        whole += 1.0;
        cents = 0.0;
    }

    Ok(format!(
        "{}{}.{:02}",
        currency_symbol(currency_code),
        group_thousands(&format!("{:.0}", whole)),
        cents as u8
    ))
}

/// Format a money amount (absolute value) with currency prefix and
/// thousands separators
pub fn format_money(amount: Money, currency_code: &str) -> String {
    let amount = amount.abs();
    format!(
        "{}{}.{:02}",
        currency_symbol(currency_code),
        group_thousands(&amount.units().unsigned_abs().to_string()),
        amount.cents_part()
    )
}

/// Format with the sign convention of the ledger list: `+` for income,
/// `-` for expenses and savings
pub fn format_signed(amount: Money, entry_type: EntryType, currency_code: &str) -> String {
    let sign = if entry_type.is_outflow() { '-' } else { '+' };
    format!("{}{}", sign, format_money(amount, currency_code))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
