//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the library.

pub mod analyze;
pub mod format;

pub use analyze::{handle_analyze_command, AnalyzeArgs};
pub use format::{handle_format_command, FormatArgs};
