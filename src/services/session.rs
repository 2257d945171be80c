//! Budget session service
//!
//! Owns the ledger of the signed-in user and runs user mutations through
//! it: apply optimistically, persist through the repository, then confirm
//! or roll back.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analysis::{analyze, BudgetAnalysis};
use crate::backend::{ChangeFeed, EntryRepository, Identity, IdentityProvider};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetEntry, BudgetEntryInput, BudgetSnapshot, CategoryMap, EntryId, EntryUpdate};
use crate::storage::LedgerStore;
use crate::sync::{change_channel, LedgerChange, ReconnectPolicy, SyncAdapter};

/// One signed-in user's budget
pub struct BudgetSession {
    identity: Identity,
    ledger: Arc<LedgerStore>,
    repository: Arc<dyn EntryRepository>,
    categories: CategoryMap,
    changes: broadcast::Sender<LedgerChange>,
}

impl BudgetSession {
    /// Create a session with an empty ledger for `identity`
    pub fn new(
        identity: Identity,
        repository: Arc<dyn EntryRepository>,
        categories: CategoryMap,
    ) -> Self {
        Self {
            ledger: Arc::new(LedgerStore::new(identity.user_id)),
            identity,
            repository,
            categories,
            changes: change_channel(),
        }
    }

    /// Create a session for whoever is signed in and load their entries
    pub async fn open(
        identities: &dyn IdentityProvider,
        repository: Arc<dyn EntryRepository>,
        categories: CategoryMap,
    ) -> BudgetResult<Self> {
        let identity = identities.current_identity().ok_or(BudgetError::NotFound {
            entity_type: "Identity",
            identifier: "signed-in user".into(),
        })?;

        let session = Self::new(identity, repository, categories);
        session.reload().await?;
        Ok(session)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Shared handle to the ledger
    pub fn ledger(&self) -> Arc<LedgerStore> {
        Arc::clone(&self.ledger)
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Register a listener for ledger changes
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerChange> {
        self.changes.subscribe()
    }

    /// Sync adapter bound to this session's ledger and listeners
    pub fn sync_adapter(&self, feed: Arc<dyn ChangeFeed>, policy: ReconnectPolicy) -> SyncAdapter {
        SyncAdapter::new(
            self.identity.user_id,
            self.ledger(),
            feed,
            Arc::clone(&self.repository),
            policy,
        )
        .with_notifier(self.changes.clone())
    }

    fn notify(&self, change: LedgerChange) {
        let _ = self.changes.send(change);
    }

    /// Replace the confirmed view with the repository's listing
    pub async fn reload(&self) -> BudgetResult<usize> {
        let entries = self.repository.list(self.identity.user_id).await?;
        let count = self.ledger.replace_all(entries)?;
        debug!("Loaded {} entries for {}", count, self.identity.email);
        self.notify(LedgerChange::Resynced { entries: count });
        Ok(count)
    }

    /// Add an entry
    ///
    /// The entry is visible in the ledger before the repository answers and
    /// is withdrawn again if the repository refuses it.
    pub async fn add(&self, input: BudgetEntryInput) -> BudgetResult<BudgetEntry> {
        let entry = self.ledger.add(input)?;
        self.notify(LedgerChange::Inserted(entry.id));

        match self.repository.create(&entry).await {
            Ok(stored) => {
                self.ledger.confirm(stored.clone())?;
                Ok(stored)
            }
            Err(e) => {
                warn!("Rolling back add of {}: {}", entry.id, e);
                self.rollback(entry.id, None)?;
                Err(e)
            }
        }
    }

    /// Replace the fields of an entry
    pub async fn update(&self, id: EntryId, update: EntryUpdate) -> BudgetResult<BudgetEntry> {
        let previous = self.ledger.get(id)?;
        let entry = self.ledger.update(id, update)?;
        self.notify(LedgerChange::Updated(id));

        match self.repository.update(&entry).await {
            Ok(stored) => {
                self.ledger.confirm(stored.clone())?;
                Ok(stored)
            }
            Err(e) => {
                warn!("Rolling back update of {}: {}", id, e);
                self.rollback(id, previous)?;
                Err(e)
            }
        }
    }

    /// Remove an entry
    pub async fn remove(&self, id: EntryId) -> BudgetResult<BudgetEntry> {
        let removed = self.ledger.remove(id)?;
        self.notify(LedgerChange::Removed(id));

        match self.repository.delete(self.identity.user_id, id).await {
            Ok(()) => {
                self.ledger.confirm_removal(id)?;
                Ok(removed)
            }
            Err(e) => {
                warn!("Rolling back removal of {}: {}", id, e);
                self.rollback(id, Some(removed))?;
                Err(e)
            }
        }
    }

    fn rollback(&self, id: EntryId, previous: Option<BudgetEntry>) -> BudgetResult<()> {
        self.ledger.restore(id, previous)?;
        self.notify(LedgerChange::RolledBack(id));
        Ok(())
    }

    /// Current entries
    pub fn snapshot(&self) -> BudgetResult<BudgetSnapshot> {
        self.ledger.all()
    }

    /// Analysis of the current ledger
    pub fn analysis(&self) -> BudgetResult<BudgetAnalysis> {
        Ok(analyze(&self.ledger.all()?, &self.categories))
    }

    /// Clear everything held for this user
    pub fn sign_out(self) -> BudgetResult<()> {
        self.ledger.reset_identity(None)?;
        self.notify(LedgerChange::Cleared);
        info!("Signed out {}", self.identity.email);
        Ok(())
    }
}
