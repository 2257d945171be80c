//! Budget entry model
//!
//! A budget entry records one income, expense or savings allocation for a
//! user. Entries are created and replaced through the ledger store; the id
//! and owner never change after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{EntryId, UserId};
use super::money::Money;

/// Maximum length of an entry name
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a category label
pub const MAX_CATEGORY_LEN: usize = 50;

/// Kind of a budget entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    #[default]
    Expense,
    Savings,
}

impl EntryType {
    /// All entry types in display order
    pub fn all() -> &'static [Self] {
        &[Self::Income, Self::Expense, Self::Savings]
    }

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Savings => "savings",
        }
    }

    /// Whether the amount flows out of income (expense or savings)
    pub fn is_outflow(&self) -> bool {
        !matches!(self, Self::Income)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Savings => write!(f, "Savings"),
        }
    }
}

impl FromStr for EntryType {
    type Err = EntryValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "savings" | "saving" => Ok(Self::Savings),
            other => Err(EntryValidationError::InvalidType(other.to_string())),
        }
    }
}

/// User-supplied fields of an entry
///
/// Used both for creation and for whole-record replacement on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntryInput {
    pub name: String,
    pub amount: Money,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub is_recurring: bool,
}

/// Replacement fields for an update; same shape as creation input
pub type EntryUpdate = BudgetEntryInput;

impl BudgetEntryInput {
    /// Create input for an entry
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        entry_type: EntryType,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category: category.into(),
            entry_type,
            is_recurring: false,
        }
    }

    /// Mark the entry as recurring
    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    /// Validate the input
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EntryValidationError::EmptyName);
        }

        if name.len() > MAX_NAME_LEN {
            return Err(EntryValidationError::NameTooLong(name.len()));
        }

        if self.category.trim().len() > MAX_CATEGORY_LEN {
            return Err(EntryValidationError::CategoryTooLong(
                self.category.trim().len(),
            ));
        }

        if self.amount.is_negative() {
            return Err(EntryValidationError::NegativeAmount(self.amount));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(EntryValidationError::AmountTooLarge(self.amount));
        }

        Ok(())
    }
}

/// A recorded income, expense or savings allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Owner of the entry
    pub user_id: UserId,

    /// Free-text label
    pub name: String,

    /// Non-negative amount in the user's base currency unit
    pub amount: Money,

    /// Free-text category used for Needs/Wants classification
    #[serde(default)]
    pub category: String,

    /// Income, expense or savings
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Informational only; does not affect totals
    #[serde(default)]
    pub is_recurring: bool,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last modified
    pub updated_at: DateTime<Utc>,
}

impl BudgetEntry {
    /// Create a new entry from validated input, assigning a fresh id
    pub fn new(user_id: UserId, input: BudgetEntryInput) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            user_id,
            name: input.name.trim().to_string(),
            amount: input.amount,
            category: input.category.trim().to_string(),
            entry_type: input.entry_type,
            is_recurring: input.is_recurring,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the user-editable fields, keeping id, owner and creation time
    pub fn apply(&mut self, update: EntryUpdate) {
        self.name = update.name.trim().to_string();
        self.amount = update.amount;
        self.category = update.category.trim().to_string();
        self.entry_type = update.entry_type;
        self.is_recurring = update.is_recurring;
        self.updated_at = Utc::now();
    }

    /// The user-editable fields of this entry
    pub fn to_input(&self) -> BudgetEntryInput {
        BudgetEntryInput {
            name: self.name.clone(),
            amount: self.amount,
            category: self.category.clone(),
            entry_type: self.entry_type,
            is_recurring: self.is_recurring,
        }
    }

    pub fn is_income(&self) -> bool {
        self.entry_type == EntryType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.entry_type == EntryType::Expense
    }

    pub fn is_savings(&self) -> bool {
        self.entry_type == EntryType::Savings
    }
}

impl fmt::Display for BudgetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.entry_type, self.amount)
    }
}

/// Validation errors for budget entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyName,
    NameTooLong(usize),
    CategoryTooLong(usize),
    NegativeAmount(Money),
    AmountTooLarge(Money),
    InvalidType(String),
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Entry name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Entry name too long ({} chars, max {})",
                len, MAX_NAME_LEN
            ),
            Self::CategoryTooLong(len) => write!(
                f,
                "Category too long ({} chars, max {})",
                len, MAX_CATEGORY_LEN
            ),
            Self::NegativeAmount(amount) => {
                write!(f, "Entry amount cannot be negative: {}", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Entry amount too large: {} (max {})",
                amount,
                Money::MAX_AMOUNT
            ),
            Self::InvalidType(t) => write!(
                f,
                "Invalid entry type '{}': expected income, expense or savings",
                t
            ),
        }
    }
}

impl std::error::Error for EntryValidationError {}

impl From<EntryValidationError> for crate::error::BudgetError {
    fn from(err: EntryValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
