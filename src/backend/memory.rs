//! In-memory collaborator backend
//!
//! Stores entries in a map and pushes every change to open subscriptions,
//! the way a hosted database with realtime channels would. Failures can be
//! injected for tests and the transport can be dropped on demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use super::{ChangeFeed, EntryRepository, Identity, IdentityProvider};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetEntry, EntryId, UserId};
use crate::sync::{ChangeEvent, FeedMessage, Subscription};

#[derive(Debug, Default)]
struct BackendState {
    identity: Option<Identity>,
    rows: HashMap<EntryId, BudgetEntry>,
    subscribers: Vec<(UserId, mpsc::UnboundedSender<FeedMessage>)>,
    fail_writes: bool,
    fail_lists: bool,
    /// Number of upcoming subscribe calls to refuse
    refused_subscribes: u32,
    subscribe_calls: u32,
}

impl BackendState {
    fn publish(&mut self, event: ChangeEvent) {
        let user = event.user_id();
        // closed receivers are pruned
        self.subscribers.retain(|(owner, tx)| {
            *owner != user || tx.send(FeedMessage::Event(event.clone())).is_ok()
        });
    }
}

/// Identity provider, entry repository and change feed in one
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> BudgetResult<MutexGuard<'_, BackendState>> {
        self.state
            .lock()
            .map_err(|e| BudgetError::Sync(format!("Backend unavailable: {}", e)))
    }

    // === Identity ===

    /// Sign in a fresh user
    pub fn sign_in(&self, email: impl Into<String>) -> BudgetResult<Identity> {
        let identity = Identity::new(email);
        self.lock()?.identity = Some(identity.clone());
        Ok(identity)
    }

    pub fn sign_out(&self) -> BudgetResult<()> {
        self.lock()?.identity = None;
        Ok(())
    }

    // === Failure injection ===

    /// Make create/update/delete fail until turned off
    pub fn set_fail_writes(&self, fail: bool) -> BudgetResult<()> {
        self.lock()?.fail_writes = fail;
        Ok(())
    }

    /// Make list fail until turned off
    pub fn set_fail_lists(&self, fail: bool) -> BudgetResult<()> {
        self.lock()?.fail_lists = fail;
        Ok(())
    }

    /// Refuse the next `count` subscribe calls
    pub fn refuse_subscribes(&self, count: u32) -> BudgetResult<()> {
        self.lock()?.refused_subscribes = count;
        Ok(())
    }

    /// Total subscribe calls seen, refused ones included
    pub fn subscribe_calls(&self) -> BudgetResult<u32> {
        Ok(self.lock()?.subscribe_calls)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> BudgetResult<usize> {
        let mut state = self.lock()?;
        state.subscribers.retain(|(_, tx)| !tx.is_closed());
        Ok(state.subscribers.len())
    }

    /// Drop every subscription as if the transport failed
    pub fn disconnect_all(&self, reason: &str) -> BudgetResult<()> {
        let mut state = self.lock()?;
        for (_, tx) in state.subscribers.drain(..) {
            let _ = tx.send(FeedMessage::Disconnected(reason.to_string()));
        }
        Ok(())
    }

    // === Changes from other devices ===

    /// Write an entry directly, as another client of the same user would
    pub fn remote_upsert(&self, entry: BudgetEntry) -> BudgetResult<()> {
        let mut state = self.lock()?;
        let event = if state.rows.contains_key(&entry.id) {
            ChangeEvent::update(&entry)
        } else {
            ChangeEvent::insert(&entry)
        };
        state.rows.insert(entry.id, entry);
        state.publish(event);
        Ok(())
    }

    /// Delete an entry directly, as another client would
    pub fn remote_delete(&self, id: EntryId) -> BudgetResult<()> {
        let mut state = self.lock()?;
        if let Some(entry) = state.rows.remove(&id) {
            state.publish(ChangeEvent::delete(&entry));
        }
        Ok(())
    }

    /// Stored copy of an entry
    pub fn stored(&self, id: EntryId) -> BudgetResult<Option<BudgetEntry>> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn check_writable(state: &BackendState) -> BudgetResult<()> {
        if state.fail_writes {
            return Err(BudgetError::Sync("Write rejected by backend".into()));
        }
        Ok(())
    }
}

impl IdentityProvider for MemoryBackend {
    fn current_identity(&self) -> Option<Identity> {
        self.lock().ok().and_then(|state| state.identity.clone())
    }
}

#[async_trait]
impl EntryRepository for MemoryBackend {
    async fn create(&self, entry: &BudgetEntry) -> BudgetResult<BudgetEntry> {
        let mut state = self.lock()?;
        Self::check_writable(&state)?;
        if state.rows.contains_key(&entry.id) {
            return Err(BudgetError::Sync(format!("Duplicate entry id {}", entry.id)));
        }

        let stored = entry.clone();
        state.rows.insert(stored.id, stored.clone());
        state.publish(ChangeEvent::insert(&stored));
        Ok(stored)
    }

    async fn update(&self, entry: &BudgetEntry) -> BudgetResult<BudgetEntry> {
        let mut state = self.lock()?;
        Self::check_writable(&state)?;

        let mut stored = entry.clone();
        match state.rows.get(&entry.id) {
            Some(existing) if existing.user_id == entry.user_id => {
                stored.created_at = existing.created_at;
            }
            _ => return Err(BudgetError::Sync(format!("No stored entry {}", entry.id))),
        }
        stored.updated_at = Utc::now();

        state.rows.insert(stored.id, stored.clone());
        state.publish(ChangeEvent::update(&stored));
        Ok(stored)
    }

    async fn delete(&self, user: UserId, id: EntryId) -> BudgetResult<()> {
        let mut state = self.lock()?;
        Self::check_writable(&state)?;

        if !state.rows.get(&id).is_some_and(|e| e.user_id == user) {
            return Ok(());
        }
        if let Some(entry) = state.rows.remove(&id) {
            state.publish(ChangeEvent::delete(&entry));
        }
        Ok(())
    }

    async fn list(&self, user: UserId) -> BudgetResult<Vec<BudgetEntry>> {
        let state = self.lock()?;
        if state.fail_lists {
            return Err(BudgetError::Sync("Listing failed".into()));
        }
        Ok(state
            .rows
            .values()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, user: UserId) -> BudgetResult<Subscription> {
        let mut state = self.lock()?;
        state.subscribe_calls += 1;
        if state.refused_subscribes > 0 {
            state.refused_subscribes -= 1;
            return Err(BudgetError::Sync("Realtime channel unavailable".into()));
        }

        let (tx, subscription) = Subscription::channel();
        state.subscribers.push((user, tx));
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetEntryInput, EntryType, Money};

    fn entry(user: UserId, name: &str) -> BudgetEntry {
        BudgetEntry::new(
            user,
            BudgetEntryInput::new(name, Money::from_units(10, 0), "Food", EntryType::Expense),
        )
    }

    #[test]
    fn test_identity() {
        let backend = MemoryBackend::new();
        assert!(backend.current_identity().is_none());

        let identity = backend.sign_in("ada@example.com").unwrap();
        assert_eq!(backend.current_identity(), Some(identity));

        backend.sign_out().unwrap();
        assert!(backend.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_create_and_list_by_user() {
        let backend = MemoryBackend::new();
        let alice = UserId::new();
        let bob = UserId::new();

        backend.create(&entry(alice, "Groceries")).await.unwrap();
        backend.create(&entry(bob, "Lunch")).await.unwrap();

        let listed = backend.list(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Groceries");
    }

    #[tokio::test]
    async fn test_changes_reach_subscribers_of_that_user() {
        let backend = MemoryBackend::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let mut alice_feed = backend.subscribe(alice).await.unwrap();
        let mut bob_feed = backend.subscribe(bob).await.unwrap();

        let created = backend.create(&entry(alice, "Groceries")).await.unwrap();
        match alice_feed.next().await {
            Some(FeedMessage::Event(ChangeEvent::Insert { record })) => {
                assert_eq!(record.id, created.id)
            }
            other => panic!("unexpected message: {:?}", other),
        }

        backend.delete(alice, created.id).await.unwrap();
        match alice_feed.next().await {
            Some(FeedMessage::Event(event)) => {
                assert!(matches!(event, ChangeEvent::Delete { .. }));
            }
            other => panic!("unexpected message: {:?}", other),
        }

        assert_eq!(backend.subscriber_count().unwrap(), 2);
        backend.disconnect_all("test").unwrap();
        assert_eq!(
            bob_feed.next().await,
            Some(FeedMessage::Disconnected("test".into()))
        );
        assert_eq!(backend.subscriber_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_ignores_other_users() {
        let backend = MemoryBackend::new();
        let alice = UserId::new();
        let created = backend.create(&entry(alice, "Rent")).await.unwrap();

        backend.delete(UserId::new(), created.id).await.unwrap();
        assert!(backend.stored(created.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let backend = MemoryBackend::new();
        let user = UserId::new();

        backend.set_fail_writes(true).unwrap();
        let err = backend.create(&entry(user, "Rent")).await.unwrap_err();
        assert!(err.is_retryable());

        backend.refuse_subscribes(1).unwrap();
        assert!(backend.subscribe(user).await.is_err());
        assert!(backend.subscribe(user).await.is_ok());
        assert_eq!(backend.subscribe_calls().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_entry_fails() {
        let backend = MemoryBackend::new();
        let err = backend.update(&entry(UserId::new(), "Rent")).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
