//! Change-feed wire types and ledger notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetEntry, EntryId, EntryType, Money, UserId};

/// Flat wire representation of a budget entry
///
/// Amounts travel as decimal numbers, timestamps as ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: EntryId,
    pub user_id: UserId,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BudgetEntry> for EntryRecord {
    fn from(entry: &BudgetEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            name: entry.name.clone(),
            amount: entry.amount.to_decimal(),
            category: entry.category.clone(),
            entry_type: entry.entry_type,
            is_recurring: entry.is_recurring,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl EntryRecord {
    /// Convert to a ledger entry
    ///
    /// Server payloads are trusted; only an amount that cannot be
    /// represented or exceeds [`Money::MAX_AMOUNT`] is rejected.
    pub fn into_entry(self) -> BudgetResult<BudgetEntry> {
        let amount = Money::from_decimal(self.amount)
            .filter(|m| m.abs() <= Money::MAX_AMOUNT)
            .ok_or_else(|| {
                BudgetError::Sync(format!(
                    "Malformed amount {} in record {}",
                    self.amount, self.id
                ))
            })?;

        Ok(BudgetEntry {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            amount,
            category: self.category,
            entry_type: self.entry_type,
            is_recurring: self.is_recurring,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A change pushed by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ChangeEvent {
    Insert { record: EntryRecord },
    Update { record: EntryRecord },
    Delete { id: EntryId, user_id: UserId },
}

impl ChangeEvent {
    pub fn insert(entry: &BudgetEntry) -> Self {
        Self::Insert {
            record: entry.into(),
        }
    }

    pub fn update(entry: &BudgetEntry) -> Self {
        Self::Update {
            record: entry.into(),
        }
    }

    pub fn delete(entry: &BudgetEntry) -> Self {
        Self::Delete {
            id: entry.id,
            user_id: entry.user_id,
        }
    }

    /// Entry the event refers to
    pub fn entry_id(&self) -> EntryId {
        match self {
            Self::Insert { record } | Self::Update { record } => record.id,
            Self::Delete { id, .. } => *id,
        }
    }

    /// User the event is scoped to
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Insert { record } | Self::Update { record } => record.user_id,
            Self::Delete { user_id, .. } => *user_id,
        }
    }
}

/// Messages delivered on a change-feed subscription
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Event(ChangeEvent),
    /// The transport dropped; the subscription is dead
    Disconnected(String),
}

/// An open change-feed subscription
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<FeedMessage>,
}

impl Subscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<FeedMessage>) -> Self {
        Self { receiver }
    }

    /// Create a connected sender/subscription pair
    pub fn channel() -> (mpsc::UnboundedSender<FeedMessage>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Next message; `None` once the feed side is gone
    pub async fn next(&mut self) -> Option<FeedMessage> {
        self.receiver.recv().await
    }
}

/// Notification sent to listeners after the ledger changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    Inserted(EntryId),
    Updated(EntryId),
    Removed(EntryId),
    /// An optimistic mutation was undone after the collaborator refused it
    RolledBack(EntryId),
    /// The ledger was reloaded from the collaborator
    Resynced { entries: usize },
    /// The ledger was emptied on sign-out
    Cleared,
}
