//! Change-feed adapter
//!
//! Subscribes to the collaborator's change feed for one user, resyncs the
//! ledger on every (re)connect and applies incoming events as confirmed
//! changes. Transport failures are retried with exponential backoff.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::event::{ChangeEvent, FeedMessage, LedgerChange, Subscription};
use super::reconnect::ReconnectPolicy;
use crate::backend::{ChangeFeed, EntryRepository};
use crate::error::{BudgetError, BudgetResult};
use crate::models::UserId;
use crate::storage::{Applied, LedgerStore};

/// Connection state of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
    /// Waiting before connect attempt number `attempt`
    Reconnecting { attempt: u32 },
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Subscribed => write!(f, "subscribed"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {})", attempt),
        }
    }
}

/// Why a subscription ended
enum Ended {
    Shutdown,
    Dropped(String),
}

/// Keeps one user's ledger in step with the remote change feed
pub struct SyncAdapter {
    user: UserId,
    ledger: Arc<LedgerStore>,
    feed: Arc<dyn ChangeFeed>,
    repository: Arc<dyn EntryRepository>,
    policy: ReconnectPolicy,
    state: watch::Sender<ConnectionState>,
    changes: broadcast::Sender<LedgerChange>,
}

impl SyncAdapter {
    pub fn new(
        user: UserId,
        ledger: Arc<LedgerStore>,
        feed: Arc<dyn ChangeFeed>,
        repository: Arc<dyn EntryRepository>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            user,
            ledger,
            feed,
            repository,
            policy,
            state: watch::Sender::new(ConnectionState::Disconnected),
            changes: super::change_channel(),
        }
    }

    /// Publish notifications on an existing channel instead of a private one
    pub fn with_notifier(mut self, changes: broadcast::Sender<LedgerChange>) -> Self {
        self.changes = changes;
        self
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Follow connection state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Register a listener for ledger changes
    pub fn subscribe_changes(&self) -> broadcast::Receiver<LedgerChange> {
        self.changes.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        debug!("Sync state -> {}", state);
        self.state.send_replace(state);
    }

    fn notify(&self, change: LedgerChange) {
        // no listeners is fine
        let _ = self.changes.send(change);
    }

    /// Drive the subscription until `shutdown` turns true or its sender
    /// is dropped
    ///
    /// Returns an error only when the reconnect policy gives up.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> BudgetResult<()> {
        let mut attempt = 0u32;

        while !*shutdown.borrow() {
            self.set_state(ConnectionState::Connecting);
            let connected = tokio::select! {
                result = self.connect() => result,
                _ = shutdown.changed() => break,
            };

            match connected {
                Ok(subscription) => {
                    attempt = 0;
                    self.set_state(ConnectionState::Subscribed);
                    info!("Subscribed to change feed for user {}", self.user);

                    match self.pump(subscription, &mut shutdown).await {
                        Ended::Shutdown => break,
                        Ended::Dropped(reason) => {
                            warn!("Change feed dropped: {}", reason);
                        }
                    }
                }
                Err(e) => warn!("Failed to connect change feed: {}", e),
            }

            attempt += 1;
            if !self.policy.allows(attempt) {
                self.set_state(ConnectionState::Disconnected);
                return Err(BudgetError::Sync(format!(
                    "Giving up on change feed after {} retries",
                    attempt - 1
                )));
            }

            let delay = self.policy.delay_for(attempt);
            self.set_state(ConnectionState::Reconnecting { attempt });
            debug!("Reconnecting in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Sync adapter stopped");
        Ok(())
    }

    /// Subscribe first, then resync, so no change between the two is lost
    async fn connect(&self) -> BudgetResult<Subscription> {
        let subscription = self.feed.subscribe(self.user).await?;
        self.resync().await?;
        Ok(subscription)
    }

    /// Reload the confirmed view from the repository
    pub async fn resync(&self) -> BudgetResult<usize> {
        let entries = self.repository.list(self.user).await?;
        let count = self.ledger.replace_all(entries)?;
        info!("Resynced ledger: {} entries", count);
        self.notify(LedgerChange::Resynced { entries: count });
        Ok(count)
    }

    async fn pump(
        &self,
        mut subscription: Subscription,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Ended {
        loop {
            tokio::select! {
                message = subscription.next() => match message {
                    Some(FeedMessage::Event(event)) => {
                        if let Err(e) = self.handle_event(event) {
                            warn!("Dropping change event: {}", e);
                        }
                    }
                    Some(FeedMessage::Disconnected(reason)) => return Ended::Dropped(reason),
                    None => return Ended::Dropped("feed closed".into()),
                },
                _ = shutdown.changed() => return Ended::Shutdown,
            }
        }
    }

    /// Apply one change event to the ledger
    ///
    /// Returns the notification sent to listeners, if the ledger changed.
    pub fn handle_event(&self, event: ChangeEvent) -> BudgetResult<Option<LedgerChange>> {
        if event.user_id() != self.user {
            debug!("Ignoring change for another user: {}", event.entry_id());
            return Ok(None);
        }

        let change = match event {
            ChangeEvent::Insert { record } => {
                let entry = record.into_entry()?;
                let id = entry.id;
                match self.ledger.apply_confirmed(entry)? {
                    Applied::Inserted => Some(LedgerChange::Inserted(id)),
                    Applied::Updated => Some(LedgerChange::Updated(id)),
                    Applied::Deferred => {
                        debug!("Insert of {} deferred to pending local change", id);
                        None
                    }
                    Applied::Ignored => {
                        debug!("Insert of {} ignored", id);
                        None
                    }
                }
            }
            ChangeEvent::Update { record } => {
                let entry = record.into_entry()?;
                let id = entry.id;
                match self.ledger.apply_confirmed_update(entry)? {
                    Applied::Inserted | Applied::Updated => Some(LedgerChange::Updated(id)),
                    Applied::Deferred => {
                        debug!("Update of {} deferred to pending local change", id);
                        None
                    }
                    Applied::Ignored => {
                        warn!("Ignoring update for unknown entry {}", id);
                        None
                    }
                }
            }
            ChangeEvent::Delete { id, .. } => {
                if self.ledger.apply_confirmed_removal(id)? {
                    Some(LedgerChange::Removed(id))
                } else {
                    warn!("Ignoring delete for unknown entry {}", id);
                    None
                }
            }
        };

        if let Some(change) = &change {
            self.notify(change.clone());
        }
        Ok(change)
    }
}
