//! Display formatting for terminal output
//!
//! Currency formatting, entry lists and the analysis report used by the CLI.

pub mod analysis;
pub mod currency;
pub mod entry;
pub mod report;

pub use analysis::format_analysis;
pub use currency::{currency_symbol, format, format_money, format_signed, DEFAULT_CURRENCY};
pub use entry::format_entry_list;
