//! Storage layer for budgetwise
//!
//! The in-memory ledger store for the active session, JSON file helpers
//! with atomic writes, and ledger import from files.

pub mod file_io;
pub mod import;
pub mod ledger;

pub use file_io::{read_json, write_json_atomic};
pub use import::{load_entries, ImportFormat};
pub use ledger::{Applied, LedgerStore, SyncState};
