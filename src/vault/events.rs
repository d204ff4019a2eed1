//! Observable vault notifications.
//!
//! `Queue` carries the id callers use as the handle for every later
//! operation. The log is append-only; a reverted execution cuts it back to
//! its length before the execution committed.

use super::types::{Address, TxId};
use serde::Serialize;

/// Vault notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    /// A call was queued.
    Queue {
        id: TxId,
        target: Address,
        value: u128,
        exec_timestamp: u64,
    },
    /// An owner confirmed a queued call.
    Confirm { id: TxId, owner: Address },
    /// An owner withdrew their confirmation.
    CancelConfirmation { id: TxId, owner: Address },
    /// A queued call was executed.
    Execute { id: TxId, executed_at: u64 },
}

impl VaultEvent {
    /// Transaction the event refers to.
    pub fn id(&self) -> &TxId {
        match self {
            Self::Queue { id, .. }
            | Self::Confirm { id, .. }
            | Self::CancelConfirmation { id, .. }
            | Self::Execute { id, .. } => id,
        }
    }
}

/// Append-only event log owned by the vault.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<VaultEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&mut self, event: VaultEvent) {
        self.entries.push(event);
    }

    pub fn entries(&self) -> &[VaultEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop events emitted after the log had `len` entries.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Take every event emitted so far.
    pub fn drain(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.entries)
    }
}
