//! In-memory ledger store
//!
//! Holds the budget entries of the signed-in user. User mutations go
//! through `add`/`update`/`remove`, which validate and apply optimistically
//! (the record is marked pending). Confirmed data from the persistence
//! collaborator or the change feed goes through the `apply_confirmed*`,
//! `confirm*` and `replace_all` paths, which trust their input.
//!
//! All state lives behind one lock so every mutation is applied whole.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetEntry, BudgetEntryInput, BudgetSnapshot, EntryId, EntryUpdate, UserId};

/// Whether the persistence collaborator has acknowledged a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Applied locally, not yet acknowledged
    Pending,
    /// Matches what the collaborator holds
    Confirmed,
}

/// Result of applying a confirmed change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Updated,
    /// Entry unknown, foreign or tombstoned; nothing changed
    Ignored,
    /// A local optimistic mutation is in flight; the local value is kept
    Deferred,
}

impl Applied {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

#[derive(Debug, Clone)]
struct LedgerRecord {
    entry: BudgetEntry,
    state: SyncState,
}

#[derive(Debug, Default)]
struct LedgerData {
    owner: Option<UserId>,
    records: HashMap<EntryId, LedgerRecord>,
    /// Ids removed during this session
    removed: HashSet<EntryId>,
    /// Removals not yet acknowledged by the collaborator
    pending_removals: HashSet<EntryId>,
}

impl LedgerData {
    fn missing(&self, id: EntryId) -> BudgetError {
        if self.removed.contains(&id) {
            BudgetError::entry_removed(id.to_string())
        } else {
            BudgetError::entry_not_found(id.to_string())
        }
    }

    fn owns(&self, entry: &BudgetEntry) -> bool {
        self.owner == Some(entry.user_id)
    }
}

/// The canonical in-memory ledger for one user session
#[derive(Debug, Default)]
pub struct LedgerStore {
    data: RwLock<LedgerData>,
}

impl LedgerStore {
    /// Create an empty ledger bound to `owner`
    pub fn new(owner: UserId) -> Self {
        Self {
            data: RwLock::new(LedgerData {
                owner: Some(owner),
                ..LedgerData::default()
            }),
        }
    }

    /// Create a ledger with no signed-in user; mutations fail until
    /// [`reset_identity`](Self::reset_identity) binds one
    pub fn unbound() -> Self {
        Self::default()
    }

    fn read(&self) -> BudgetResult<RwLockReadGuard<'_, LedgerData>> {
        self.data
            .read()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> BudgetResult<RwLockWriteGuard<'_, LedgerData>> {
        self.data
            .write()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// The user this ledger belongs to
    pub fn owner(&self) -> BudgetResult<Option<UserId>> {
        Ok(self.read()?.owner)
    }

    /// Drop every entry, tombstone and pending mark and bind a new identity
    ///
    /// Called on sign-out (`None`) and on identity change.
    pub fn reset_identity(&self, owner: Option<UserId>) -> BudgetResult<()> {
        let mut data = self.write()?;
        *data = LedgerData {
            owner,
            ..LedgerData::default()
        };
        Ok(())
    }

    // === User mutations (validated, optimistic) ===

    /// Validate and insert a new entry with a fresh id
    pub fn add(&self, input: BudgetEntryInput) -> BudgetResult<BudgetEntry> {
        input.validate()?;

        let mut data = self.write()?;
        let owner = data
            .owner
            .ok_or_else(|| BudgetError::Storage("Ledger has no signed-in user".into()))?;

        let entry = BudgetEntry::new(owner, input);
        data.records.insert(
            entry.id,
            LedgerRecord {
                entry: entry.clone(),
                state: SyncState::Pending,
            },
        );
        Ok(entry)
    }

    /// Replace the editable fields of an entry
    pub fn update(&self, id: EntryId, update: EntryUpdate) -> BudgetResult<BudgetEntry> {
        update.validate()?;

        let mut data = self.write()?;
        if let Some(record) = data.records.get_mut(&id) {
            record.entry.apply(update);
            record.state = SyncState::Pending;
            return Ok(record.entry.clone());
        }
        Err(data.missing(id))
    }

    /// Remove an entry, returning its last value
    ///
    /// Removing the same id twice fails; the second error reports the entry
    /// as already removed.
    pub fn remove(&self, id: EntryId) -> BudgetResult<BudgetEntry> {
        let mut data = self.write()?;
        let removed = data.records.remove(&id);
        match removed {
            Some(record) => {
                data.removed.insert(id);
                data.pending_removals.insert(id);
                Ok(record.entry)
            }
            None => Err(data.missing(id)),
        }
    }

    // === Reads ===

    /// Get an entry by id
    pub fn get(&self, id: EntryId) -> BudgetResult<Option<BudgetEntry>> {
        Ok(self.read()?.records.get(&id).map(|r| r.entry.clone()))
    }

    /// Snapshot of all entries, ordered by creation time then id
    pub fn all(&self) -> BudgetResult<BudgetSnapshot> {
        let data = self.read()?;
        let mut entries: Vec<_> = data.records.values().map(|r| r.entry.clone()).collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    pub fn contains(&self, id: EntryId) -> BudgetResult<bool> {
        Ok(self.read()?.records.contains_key(&id))
    }

    pub fn len(&self) -> BudgetResult<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> BudgetResult<bool> {
        Ok(self.read()?.records.is_empty())
    }

    /// Sync state of an entry, if present
    pub fn sync_state(&self, id: EntryId) -> BudgetResult<Option<SyncState>> {
        Ok(self.read()?.records.get(&id).map(|r| r.state))
    }

    /// Number of local mutations not yet acknowledged
    pub fn pending_count(&self) -> BudgetResult<usize> {
        let data = self.read()?;
        let pending = data
            .records
            .values()
            .filter(|r| r.state == SyncState::Pending)
            .count();
        Ok(pending + data.pending_removals.len())
    }

    // === Confirmed paths (no revalidation) ===

    /// Apply an insert or update that the collaborator already accepted
    pub fn apply_confirmed(&self, entry: BudgetEntry) -> BudgetResult<Applied> {
        let mut data = self.write()?;
        Ok(apply_confirmed_to(&mut data, entry, true))
    }

    /// Apply a confirmed update; entries not present are ignored
    pub fn apply_confirmed_update(&self, entry: BudgetEntry) -> BudgetResult<Applied> {
        let mut data = self.write()?;
        Ok(apply_confirmed_to(&mut data, entry, false))
    }

    /// Apply a confirmed removal; returns whether an entry was dropped
    pub fn apply_confirmed_removal(&self, id: EntryId) -> BudgetResult<bool> {
        let mut data = self.write()?;
        data.pending_removals.remove(&id);
        if data.records.remove(&id).is_some() {
            data.removed.insert(id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Reconcile a pending record with the collaborator's response
    ///
    /// Returns false when the entry was removed locally in the meantime.
    pub fn confirm(&self, entry: BudgetEntry) -> BudgetResult<bool> {
        let mut data = self.write()?;
        match data.records.get_mut(&entry.id) {
            Some(record) => {
                record.entry = entry;
                record.state = SyncState::Confirmed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Mark a local removal as acknowledged
    pub fn confirm_removal(&self, id: EntryId) -> BudgetResult<()> {
        self.write()?.pending_removals.remove(&id);
        Ok(())
    }

    /// Roll back an optimistic mutation
    ///
    /// `previous` is the value before the mutation: `None` undoes an insert,
    /// `Some` reinstates an updated or removed entry as confirmed.
    pub fn restore(&self, id: EntryId, previous: Option<BudgetEntry>) -> BudgetResult<()> {
        let mut data = self.write()?;
        data.pending_removals.remove(&id);
        match previous {
            Some(entry) => {
                data.removed.remove(&id);
                data.records.insert(
                    id,
                    LedgerRecord {
                        entry,
                        state: SyncState::Confirmed,
                    },
                );
            }
            None => {
                data.records.remove(&id);
            }
        }
        Ok(())
    }

    /// Replace the confirmed view with a fresh listing from the collaborator
    ///
    /// Pending local mutations survive: pending records keep their local
    /// value and pending removals are not resurrected. Returns the number of
    /// entries in the ledger afterwards.
    pub fn replace_all(&self, entries: Vec<BudgetEntry>) -> BudgetResult<usize> {
        let mut data = self.write()?;

        let mut records: HashMap<EntryId, LedgerRecord> = data
            .records
            .drain()
            .filter(|(_, r)| r.state == SyncState::Pending)
            .collect();

        for entry in entries {
            if !data.owns(&entry)
                || data.pending_removals.contains(&entry.id)
                || records.contains_key(&entry.id)
            {
                continue;
            }
            records.insert(
                entry.id,
                LedgerRecord {
                    entry,
                    state: SyncState::Confirmed,
                },
            );
        }

        data.records = records;
        Ok(data.records.len())
    }
}

fn apply_confirmed_to(data: &mut LedgerData, entry: BudgetEntry, insert_missing: bool) -> Applied {
    if !data.owns(&entry) || data.removed.contains(&entry.id) {
        return Applied::Ignored;
    }

    let id = entry.id;
    match data.records.get_mut(&id) {
        Some(record) if record.state == SyncState::Pending => Applied::Deferred,
        Some(record) => {
            record.entry = entry;
            Applied::Updated
        }
        None if insert_missing => {
            data.records.insert(
                id,
                LedgerRecord {
                    entry,
                    state: SyncState::Confirmed,
                },
            );
            Applied::Inserted
        }
        None => Applied::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryType, Money};

    fn input(name: &str, cents: i64, entry_type: EntryType) -> BudgetEntryInput {
        BudgetEntryInput::new(name, Money::from_cents(cents), "Housing", entry_type)
    }

    fn confirmed(store: &LedgerStore, entry: &BudgetEntry) {
        assert!(store.confirm(entry.clone()).unwrap());
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let store = LedgerStore::new(UserId::new());
        let a = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        let b = store.add(input("Rent", 100, EntryType::Expense)).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.sync_state(a.id).unwrap(), Some(SyncState::Pending));
    }

    #[test]
    fn test_add_rejects_invalid_input_without_applying() {
        let store = LedgerStore::new(UserId::new());

        let err = store.add(input("", 100, EntryType::Expense)).unwrap_err();
        assert!(err.is_validation());

        let err = store.add(input("Rent", -1, EntryType::Expense)).unwrap_err();
        assert!(err.is_validation());

        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_add_requires_identity() {
        let store = LedgerStore::unbound();
        let err = store.add(input("Rent", 100, EntryType::Expense)).unwrap_err();
        assert!(matches!(err, BudgetError::Storage(_)));
    }

    #[test]
    fn test_update_replaces_fields() {
        let store = LedgerStore::new(UserId::new());
        let entry = store.add(input("Rent", 100, EntryType::Expense)).unwrap();

        let updated = store
            .update(entry.id, input("Paycheck", 5000, EntryType::Income))
            .unwrap();
        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.entry_type, EntryType::Income);
        assert_eq!(store.get(entry.id).unwrap(), Some(updated));
    }

    #[test]
    fn test_update_validation_failure_leaves_entry_untouched() {
        let store = LedgerStore::new(UserId::new());
        let entry = store.add(input("Rent", 100, EntryType::Expense)).unwrap();

        let err = store
            .update(entry.id, input("Rent", -5, EntryType::Expense))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.get(entry.id).unwrap(), Some(entry));
    }

    #[test]
    fn test_update_unknown_id() {
        let store = LedgerStore::new(UserId::new());
        let err = store
            .update(EntryId::new(), input("Rent", 100, EntryType::Expense))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_removed());
    }

    #[test]
    fn test_double_remove_fails() {
        let store = LedgerStore::new(UserId::new());
        let entry = store.add(input("Rent", 100, EntryType::Expense)).unwrap();

        store.remove(entry.id).unwrap();
        let err = store.remove(entry.id).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.is_removed());

        let err = store.remove(EntryId::new()).unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_removed());

        let err = store
            .update(entry.id, input("Rent", 100, EntryType::Expense))
            .unwrap_err();
        assert!(err.is_removed());
    }

    #[test]
    fn test_all_is_ordered_by_creation() {
        let store = LedgerStore::new(UserId::new());
        let first = store.add(input("First", 1, EntryType::Income)).unwrap();
        let second = store.add(input("Second", 2, EntryType::Income)).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        if first.created_at == second.created_at {
            assert_eq!(all[0].id, first.id.min(second.id));
        } else {
            assert_eq!(all[0].id, first.id);
            assert_eq!(all[1].id, second.id);
        }
        // Repeated snapshots are identical
        assert_eq!(store.all().unwrap(), all);
    }

    #[test]
    fn test_reset_identity_clears_everything() {
        let store = LedgerStore::new(UserId::new());
        let entry = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        store.remove(entry.id).unwrap();
        store.add(input("Food", 100, EntryType::Expense)).unwrap();

        let next = UserId::new();
        store.reset_identity(Some(next)).unwrap();

        assert!(store.is_empty().unwrap());
        assert_eq!(store.pending_count().unwrap(), 0);
        assert_eq!(store.owner().unwrap(), Some(next));
        // Tombstones are gone too
        assert!(!store.remove(entry.id).unwrap_err().is_removed());
    }

    #[test]
    fn test_apply_confirmed_insert_and_update() {
        let user = UserId::new();
        let store = LedgerStore::new(user);
        let mut remote = BudgetEntry::new(user, input("Rent", 100, EntryType::Expense));

        assert_eq!(store.apply_confirmed(remote.clone()).unwrap(), Applied::Inserted);
        assert_eq!(store.sync_state(remote.id).unwrap(), Some(SyncState::Confirmed));

        remote.amount = Money::from_cents(200);
        assert_eq!(
            store.apply_confirmed_update(remote.clone()).unwrap(),
            Applied::Updated
        );
        assert_eq!(store.get(remote.id).unwrap().unwrap().amount.cents(), 200);
    }

    #[test]
    fn test_apply_confirmed_skips_invalid_payload_check() {
        let user = UserId::new();
        let store = LedgerStore::new(user);
        let mut remote = BudgetEntry::new(user, input("Rent", 100, EntryType::Expense));
        remote.name = String::new();

        assert_eq!(store.apply_confirmed(remote).unwrap(), Applied::Inserted);
    }

    #[test]
    fn test_apply_confirmed_ignores_foreign_and_unknown() {
        let store = LedgerStore::new(UserId::new());
        let foreign = BudgetEntry::new(UserId::new(), input("Rent", 100, EntryType::Expense));

        assert_eq!(store.apply_confirmed(foreign.clone()).unwrap(), Applied::Ignored);
        assert_eq!(store.apply_confirmed_update(foreign.clone()).unwrap(), Applied::Ignored);
        assert!(!store.apply_confirmed_removal(foreign.id).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_apply_confirmed_defers_to_pending_local() {
        let store = LedgerStore::new(UserId::new());
        let local = store.add(input("Rent", 100, EntryType::Expense)).unwrap();

        let mut stale = local.clone();
        stale.amount = Money::from_cents(1);
        assert_eq!(store.apply_confirmed(stale).unwrap(), Applied::Deferred);
        assert_eq!(store.get(local.id).unwrap(), Some(local));
    }

    #[test]
    fn test_confirmed_insert_of_removed_id_is_ignored() {
        let store = LedgerStore::new(UserId::new());
        let local = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        store.remove(local.id).unwrap();

        assert_eq!(store.apply_confirmed(local.clone()).unwrap(), Applied::Ignored);
        assert!(!store.contains(local.id).unwrap());
    }

    #[test]
    fn test_restore_rolls_back_each_mutation_kind() {
        let store = LedgerStore::new(UserId::new());

        // Insert rollback
        let added = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        store.restore(added.id, None).unwrap();
        assert!(store.is_empty().unwrap());

        // Update rollback
        let original = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        confirmed(&store, &original);
        store
            .update(original.id, input("Rent", 900, EntryType::Expense))
            .unwrap();
        store.restore(original.id, Some(original.clone())).unwrap();
        assert_eq!(store.get(original.id).unwrap(), Some(original.clone()));

        // Removal rollback
        let removed = store.remove(original.id).unwrap();
        store.restore(removed.id, Some(removed.clone())).unwrap();
        assert!(store.contains(removed.id).unwrap());
        assert_eq!(store.pending_count().unwrap(), 0);
        // The tombstone is lifted, so a later removal succeeds
        store.remove(removed.id).unwrap();
    }

    #[test]
    fn test_replace_all_keeps_pending_mutations() {
        let user = UserId::new();
        let store = LedgerStore::new(user);

        let kept_local = store.add(input("Local", 100, EntryType::Expense)).unwrap();
        let to_remove = store.add(input("Gone", 100, EntryType::Expense)).unwrap();
        confirmed(&store, &to_remove);
        store.remove(to_remove.id).unwrap();

        let mut stale_local = kept_local.clone();
        stale_local.amount = Money::from_cents(1);
        let remote_only = BudgetEntry::new(user, input("Remote", 300, EntryType::Income));
        let foreign = BudgetEntry::new(UserId::new(), input("Other", 1, EntryType::Income));

        let count = store
            .replace_all(vec![
                stale_local,
                to_remove.clone(),
                remote_only.clone(),
                foreign,
            ])
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.get(kept_local.id).unwrap(), Some(kept_local));
        assert!(store.contains(remote_only.id).unwrap());
        assert!(!store.contains(to_remove.id).unwrap());
    }

    #[test]
    fn test_replace_all_drops_confirmed_entries_missing_remotely() {
        let user = UserId::new();
        let store = LedgerStore::new(user);
        let entry = store.add(input("Rent", 100, EntryType::Expense)).unwrap();
        confirmed(&store, &entry);

        assert_eq!(store.replace_all(Vec::new()).unwrap(), 0);
        assert!(!store.contains(entry.id).unwrap());
    }
}
