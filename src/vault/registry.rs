//! Transaction registry.
//!
//! Engine-owned map from `TxId` to `TransactionRecord`. Records are never
//! removed; the only way a record leaves the pending set is execution.
//! The one exception is `revert`, which rolls back mutations made while a
//! dispatch was in flight.

use super::traits::{TimelockError, TimelockResult};
use super::types::{Address, TransactionRecord, TxId};
use std::collections::BTreeMap;

/// Store of transaction records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TransactionRegistry {
    records: BTreeMap<TxId, TransactionRecord>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TxId) -> Option<&TransactionRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.values()
    }

    /// Queued, unexecuted records.
    pub fn pending(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.values().filter(|r| r.is_pending())
    }

    /// Insert a new record. Fails if the id is already present.
    pub(crate) fn insert(&mut self, record: TransactionRecord) -> TimelockResult<()> {
        if let Some(existing) = self.records.get(&record.id) {
            return Err(if existing.executed {
                TimelockError::AlreadyExecuted(existing.id)
            } else {
                TimelockError::AlreadyQueued(existing.id)
            });
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Mutable access to a pending record.
    ///
    /// Missing or never-queued ids fail with `UnknownId`; executed records
    /// with `AlreadyExecuted`, so callers can never mutate a terminal record.
    pub(crate) fn pending_mut(&mut self, id: &TxId) -> TimelockResult<&mut TransactionRecord> {
        match self.records.get_mut(id) {
            Some(record) if record.executed => Err(TimelockError::AlreadyExecuted(*id)),
            Some(record) if record.queued => Ok(record),
            _ => Err(TimelockError::UnknownId(*id)),
        }
    }
}

/// A registry mutation made while a dispatch is in flight, recorded so a
/// failed dispatch can take it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Undo {
    Queued(TxId),
    Confirmed(TxId, Address),
    Cancelled(TxId, Address),
    Executed(TxId),
}

impl TransactionRegistry {
    /// Roll back one mutation. Entries must be reverted newest first.
    pub(crate) fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::Queued(id) => {
                self.records.remove(&id);
            }
            Undo::Confirmed(id, owner) => {
                if let Some(record) = self.records.get_mut(&id) {
                    record.remove_confirmation(&owner);
                }
            }
            Undo::Cancelled(id, owner) => {
                if let Some(record) = self.records.get_mut(&id) {
                    record.add_confirmation(owner);
                }
            }
            Undo::Executed(id) => {
                if let Some(record) = self.records.get_mut(&id) {
                    record.clear_executed();
                }
            }
        }
    }
}
