//! Core data models for budgetwise
//!
//! This module contains the data structures of the budgeting domain:
//! entries, their ids, money amounts and the category taxonomy.

pub mod category;
pub mod entry;
pub mod ids;
pub mod money;

pub use category::{Bucket, CategoryMap};
pub use entry::{BudgetEntry, BudgetEntryInput, EntryType, EntryUpdate, EntryValidationError};
pub use ids::{EntryId, UserId};
pub use money::Money;

/// An immutable view of a ledger at one instant
pub type BudgetSnapshot = Vec<BudgetEntry>;
