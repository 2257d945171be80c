//! User settings for budgetwise
//!
//! Holds the preferred currency, the category taxonomy used by the
//! analysis engine and the reconnect policy of the sync adapter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::BudgetPaths;
use crate::display::currency::DEFAULT_CURRENCY;
use crate::error::BudgetError;
use crate::models::CategoryMap;
use crate::storage::{read_json, write_json_atomic};
use crate::sync::ReconnectPolicy;

/// Reconnect settings for the realtime change feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Delay before the first reconnect attempt, in milliseconds
    #[serde(default = "default_initial_retry_ms")]
    pub initial_retry_ms: u64,

    /// Upper bound for the backoff delay, in milliseconds
    #[serde(default = "default_max_retry_ms")]
    pub max_retry_ms: u64,

    /// Give up after this many consecutive failures (None retries forever)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_initial_retry_ms() -> u64 {
    500
}

fn default_max_retry_ms() -> u64 {
    30_000
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            initial_retry_ms: default_initial_retry_ms(),
            max_retry_ms: default_max_retry_ms(),
            max_attempts: None,
        }
    }
}

impl SyncSettings {
    /// The reconnect policy these settings describe
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.initial_retry_ms),
            max_delay: Duration::from_millis(self.max_retry_ms.max(self.initial_retry_ms)),
            max_attempts: self.max_attempts,
        }
    }
}

/// User settings for budgetwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Preferred currency code for display
    #[serde(default = "default_currency")]
    pub currency_code: String,

    /// Needs/Wants taxonomy for the 50/30/20 analysis
    #[serde(default)]
    pub categories: CategoryMap,

    /// Change feed reconnect policy
    #[serde(default)]
    pub sync: SyncSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_code: default_currency(),
            categories: CategoryMap::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if no file exists yet
    ///
    /// Defaults are not written; the caller decides when to persist.
    pub fn load_or_create(paths: &BudgetPaths) -> Result<Self, BudgetError> {
        let settings: Settings = read_json(paths.settings_file())
            .map_err(|e| BudgetError::Config(format!("Failed to load settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BudgetPaths) -> Result<(), BudgetError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Check values serde cannot enforce
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.currency_code.trim().is_empty() {
            return Err(BudgetError::Config("currency_code cannot be empty".into()));
        }
        if self.sync.initial_retry_ms == 0 {
            return Err(BudgetError::Config(
                "sync.initial_retry_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
