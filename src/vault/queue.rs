//! Queueing new transactions.

use super::events::VaultEvent;
use super::registry::Undo;
use super::traits::{TimelockError, TimelockResult};
use super::types::{Address, Call, TransactionRecord, TxId};
use super::TimelockVault;

impl TimelockVault {
    /// Queue `call` for later execution and return its id.
    ///
    /// The id is the only handle for `confirm`, `cancel_confirmation` and
    /// `execute`; it is also published in the `Queue` event.
    ///
    /// Fails with:
    /// - `NotAnOwner` if `caller` is not an owner
    /// - `IncorrectExecutionTime` if `exec_timestamp < now + min_delay`
    /// - `AlreadyQueued` if the identical call is queued and unexecuted
    /// - `AlreadyExecuted` if the identical call was already executed
    pub fn add_to_queue(&mut self, caller: &Address, call: Call) -> TimelockResult<TxId> {
        self.owners.authorize(caller)?;

        let now = self.now();
        let earliest_allowed = now.checked_add(self.config.min_delay).ok_or(
            TimelockError::IncorrectExecutionTime {
                exec_timestamp: call.exec_timestamp,
                earliest_allowed: u64::MAX,
            },
        )?;
        if call.exec_timestamp < earliest_allowed {
            return Err(TimelockError::IncorrectExecutionTime {
                exec_timestamp: call.exec_timestamp,
                earliest_allowed,
            });
        }

        let id = call.id()?;
        let event = VaultEvent::Queue {
            id,
            target: call.target,
            value: call.value,
            exec_timestamp: call.exec_timestamp,
        };

        self.registry.insert(TransactionRecord::queued(id, call, now))?;
        self.journal(Undo::Queued(id));
        self.events.emit(event);

        tracing::info!(%id, %caller, "transaction queued");
        Ok(id)
    }
}
