//! Configuration module for budgetwise
//!
//! Path resolution and persisted user settings.

pub mod paths;
pub mod settings;

pub use paths::BudgetPaths;
pub use settings::{Settings, SyncSettings};
