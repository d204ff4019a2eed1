//! Time-locked multi-owner transaction vault.
//!
//! Lifecycle of a transaction:
//! 1. An owner queues a `Call` with `exec_timestamp >= now + min_delay`
//! 2. Owners confirm (and may cancel their confirmation) while it is queued
//! 3. Once ledger time reaches `exec_timestamp` and every owner has
//!    confirmed, any owner executes it; the record becomes terminal
//!
//! Operations are split across `queue`, `confirmation` and `execution`, each
//! an `impl TimelockVault` block.

pub mod clock;
pub mod confirmation;
pub mod events;
pub mod execution;
pub mod mock;
pub mod owners;
pub mod queue;
pub mod registry;
pub mod traits;
pub mod types;

#[cfg(test)]
mod proptests;

pub use clock::{LedgerClock, ManualClock, SystemClock};
pub use events::{EventLog, VaultEvent};
pub use owners::OwnerRegistry;
pub use registry::TransactionRegistry;

use registry::Undo;
pub use traits::{ErrorKind, ExternalTarget, TargetError, TimelockError, TimelockResult};
pub use types::{Address, Call, RecordView, TransactionRecord, TxId};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum ledger seconds between queueing and the earliest execution time.
pub const MIN_DELAY: u64 = 60;

/// Vault construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockConfig {
    /// Minimum delay in ledger seconds.
    #[serde(default = "default_min_delay")]
    pub min_delay: u64,
}

fn default_min_delay() -> u64 {
    MIN_DELAY
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            min_delay: MIN_DELAY,
        }
    }
}

/// The vault: owners, transaction records, event log and ledger clock.
pub struct TimelockVault {
    owners: OwnerRegistry,
    registry: TransactionRegistry,
    events: EventLog,
    clock: Arc<dyn LedgerClock>,
    config: TimelockConfig,
    /// Undo journal of the execution currently dispatching, if any.
    in_flight: Option<Vec<Undo>>,
}

impl TimelockVault {
    /// Create a vault with the default `MIN_DELAY`.
    pub fn new(
        owners: impl IntoIterator<Item = Address>,
        clock: Arc<dyn LedgerClock>,
    ) -> TimelockResult<Self> {
        Self::with_config(owners, clock, TimelockConfig::default())
    }

    pub fn with_config(
        owners: impl IntoIterator<Item = Address>,
        clock: Arc<dyn LedgerClock>,
        config: TimelockConfig,
    ) -> TimelockResult<Self> {
        let owners = OwnerRegistry::new(owners)?;
        tracing::debug!(
            owners = owners.size(),
            min_delay = config.min_delay,
            "timelock vault created"
        );

        Ok(Self {
            owners,
            registry: TransactionRegistry::new(),
            events: EventLog::new(),
            clock,
            config,
            in_flight: None,
        })
    }

    /// Current ledger time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn owners(&self) -> &OwnerRegistry {
        &self.owners
    }

    pub fn min_delay(&self) -> u64 {
        self.config.min_delay
    }

    /// Confirmations required to execute: every owner.
    pub fn required_confirmations(&self) -> usize {
        self.owners.size()
    }

    /// Record summary, or `None` if nothing was queued under `id`.
    pub fn get_record(&self, id: &TxId) -> Option<RecordView> {
        self.registry.get(id).map(TransactionRecord::view)
    }

    /// Full record.
    pub fn record(&self, id: &TxId) -> Option<&TransactionRecord> {
        self.registry.get(id)
    }

    /// Queued records that have not been executed.
    pub fn pending(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.registry.pending()
    }

    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    pub fn events(&self) -> &[VaultEvent] {
        self.events.entries()
    }

    /// Take every event emitted so far.
    ///
    /// Returns nothing while an execution is dispatching: a failing dispatch
    /// still retracts the newest events.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        if self.is_dispatching() {
            return Vec::new();
        }
        self.events.drain()
    }

    /// Whether an `execute` is currently dispatching to its target.
    pub fn is_dispatching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Note a registry mutation so a failing dispatch can revert it.
    /// No-op outside a dispatch.
    fn journal(&mut self, undo: Undo) {
        if let Some(journal) = self.in_flight.as_mut() {
            journal.push(undo);
        }
    }
}
