//! Ledger import from JSON and CSV files
//!
//! JSON files hold an array of rows (or an object with an `entries` array);
//! CSV files carry a header row `name,amount,category,type,recurring`.
//! Amounts are decimal numbers. Every row is validated exactly like a
//! user-added entry, and the first bad row aborts the import.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetEntry, BudgetEntryInput, EntryType, Money, UserId};

/// Supported import file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> BudgetResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(BudgetError::Import(format!(
                "Unsupported file type: {} (expected .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// One row of an import file
#[derive(Debug, Clone, Deserialize)]
struct ImportRow {
    name: String,
    amount: f64,
    #[serde(default)]
    category: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default, alias = "is_recurring")]
    recurring: Option<RecurringFlag>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecurringFlag {
    Bool(bool),
    Text(String),
}

impl RecurringFlag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "y" | "1"
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonLedger {
    Rows(Vec<ImportRow>),
    Wrapped { entries: Vec<ImportRow> },
}

impl ImportRow {
    fn into_input(self) -> BudgetResult<BudgetEntryInput> {
        let entry_type: EntryType = self.entry_type.parse()?;
        let amount = Money::from_decimal(self.amount)
            .ok_or_else(|| BudgetError::Validation(format!("Invalid amount: {}", self.amount)))?;

        let mut input = BudgetEntryInput::new(self.name, amount, self.category, entry_type);
        input.is_recurring = self.recurring.map(|r| r.is_set()).unwrap_or(false);
        input.validate()?;
        Ok(input)
    }
}

fn rows_to_entries(rows: Vec<ImportRow>, user: UserId) -> BudgetResult<Vec<BudgetEntry>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_input()
                .map(|input| BudgetEntry::new(user, input))
                .map_err(|e| BudgetError::Import(format!("Row {}: {}", i + 1, e)))
        })
        .collect()
}

/// Parse entries from JSON text
pub fn parse_json(data: &str, user: UserId) -> BudgetResult<Vec<BudgetEntry>> {
    let ledger: JsonLedger = serde_json::from_str(data)
        .map_err(|e| BudgetError::Import(format!("Invalid JSON ledger: {}", e)))?;
    let rows = match ledger {
        JsonLedger::Rows(rows) => rows,
        JsonLedger::Wrapped { entries } => entries,
    };
    rows_to_entries(rows, user)
}

/// Parse entries from CSV text with a header row
pub fn parse_csv(data: &str, user: UserId) -> BudgetResult<Vec<BudgetEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let rows = reader
        .deserialize::<ImportRow>()
        .collect::<Result<Vec<_>, _>>()?;
    rows_to_entries(rows, user)
}

/// Load entries from a `.json` or `.csv` file
pub fn load_entries(path: &Path, user: UserId) -> BudgetResult<Vec<BudgetEntry>> {
    let format = ImportFormat::from_path(path)?;
    let data = fs::read_to_string(path).map_err(|e| {
        BudgetError::Import(format!("Failed to read {}: {}", path.display(), e))
    })?;

    match format {
        ImportFormat::Json => parse_json(&data, user),
        ImportFormat::Csv => parse_csv(&data, user),
    }
}
