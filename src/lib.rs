//! budgetwise - budget analysis engine
//!
//! This library derives income, expense and savings totals and the 50/30/20
//! allocation from a ledger of budget entries, and keeps that ledger current
//! as entries are added, edited or removed locally or on another device.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Entries, money, ids and the Needs/Wants taxonomy
//! - `storage`: The in-memory ledger store and ledger file import
//! - `analysis`: The 50/30/20 analysis engine
//! - `display`: Currency formatting and terminal reports
//! - `backend`: Identity, persistence and change-feed collaborators
//! - `sync`: The change-feed adapter with reconnect
//! - `services`: The budget session tying ledger, persistence and analysis
//! - `cli`: Command handlers for the `budgetwise` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use budgetwise::analysis::analyze;
//! use budgetwise::models::{BudgetEntryInput, CategoryMap, EntryType, Money, UserId};
//! use budgetwise::storage::LedgerStore;
//!
//! let ledger = LedgerStore::new(UserId::new());
//! ledger.add(BudgetEntryInput::new("Salary", Money::from_units(5000, 0), "Job", EntryType::Income))?;
//! let analysis = analyze(&ledger.all()?, &CategoryMap::default());
//! ```

pub mod analysis;
pub mod backend;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod sync;

pub use error::{BudgetError, BudgetResult};
