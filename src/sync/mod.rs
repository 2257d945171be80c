//! Realtime sync
//!
//! Bridges the collaborator's change feed into the ledger store and keeps
//! the subscription alive across transport failures.

mod adapter;
mod event;
mod reconnect;

pub use adapter::{ConnectionState, SyncAdapter};
pub use event::{ChangeEvent, EntryRecord, FeedMessage, LedgerChange, Subscription};
pub use reconnect::ReconnectPolicy;

use tokio::sync::broadcast;

/// Buffered notifications per listener before it starts lagging
pub const CHANGE_BUFFER: usize = 256;

/// Channel used to notify listeners of ledger changes
pub fn change_channel() -> broadcast::Sender<LedgerChange> {
    broadcast::channel(CHANGE_BUFFER).0
}
