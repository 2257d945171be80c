//! External collaborators
//!
//! The ledger talks to an identity provider, a persistence service and a
//! realtime change feed. Each is a trait so the session and the sync
//! adapter can run against any implementation; [`MemoryBackend`] provides
//! all three in memory.

mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BudgetResult;
use crate::models::{BudgetEntry, EntryId, UserId};
use crate::sync::Subscription;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(),
            email: email.into(),
        }
    }
}

/// Source of the current identity
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any
    fn current_identity(&self) -> Option<Identity>;
}

/// Remote persistence for budget entries
///
/// Failures are reported as [`BudgetError::Sync`](crate::error::BudgetError::Sync).
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Store a new entry, returning the stored value
    async fn create(&self, entry: &BudgetEntry) -> BudgetResult<BudgetEntry>;

    /// Replace an existing entry, returning the stored value
    async fn update(&self, entry: &BudgetEntry) -> BudgetResult<BudgetEntry>;

    async fn delete(&self, user: UserId, id: EntryId) -> BudgetResult<()>;

    /// Every entry owned by `user`
    async fn list(&self, user: UserId) -> BudgetResult<Vec<BudgetEntry>>;
}

/// Realtime feed of entry changes
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription for the changes of `user`
    async fn subscribe(&self, user: UserId) -> BudgetResult<Subscription>;
}
