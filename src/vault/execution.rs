//! Executing queued transactions.
//!
//! Checks-effects-interactions: every check runs first, then the record is
//! marked executed and the `Execute` event emitted, and only then is the
//! target called. A target that calls back into the vault therefore sees the
//! record as executed and cannot run it again.
//!
//! Only one execution dispatches at a time. While the target runs, a nested
//! `execute` is refused (`ExecutionInProgress`), so no other target is ever
//! called from inside a dispatch. Queueing and confirmations made by the
//! target are allowed and journalled.
//!
//! Execution is all-or-nothing. If the target fails, the journal is replayed
//! backwards, the record's executed flag is cleared and the event log is cut
//! back to its length before the commit. A failed dispatch leaves
//! `executed == false`. Nothing is copied up front, so the cost of a revert
//! depends only on what the target did.

use super::events::VaultEvent;
use super::registry::Undo;
use super::traits::{ExternalTarget, TimelockError, TimelockResult};
use super::types::{Address, Call, TxId};
use super::TimelockVault;

impl TimelockVault {
    /// Execute a queued, fully confirmed call whose time has come.
    ///
    /// `call` must match the queued tuple exactly, value included; anything
    /// else hashes to a different id and fails with `UnknownId`. `target`
    /// is the collaborator reachable at `call.target`.
    ///
    /// Checks, in order: owner, known id, not executed, no other execution
    /// dispatching, target handle, readiness (`NotReadyYet`), threshold
    /// (`InsufficientConfirmations`). A failing target surfaces as
    /// `ExecutionFailed` with its reason.
    pub fn execute(
        &mut self,
        caller: &Address,
        target: &mut dyn ExternalTarget,
        call: &Call,
    ) -> TimelockResult<TxId> {
        self.owners.authorize(caller)?;

        let id = call.id()?;
        let now = self.now();
        let required = self.required_confirmations();

        let record = self.registry.pending_mut(&id)?;

        if self.in_flight.is_some() {
            return Err(TimelockError::ExecutionInProgress(id));
        }

        let actual = target.address();
        if actual != call.target {
            return Err(TimelockError::TargetMismatch {
                expected: call.target,
                actual,
            });
        }

        if now < call.exec_timestamp {
            return Err(TimelockError::NotReadyYet {
                now,
                exec_timestamp: call.exec_timestamp,
            });
        }

        let have = record.confirmations_count();
        if have < required {
            return Err(TimelockError::InsufficientConfirmations {
                have,
                need: required,
            });
        }

        // Effects
        record.mark_executed(now);
        let events_len = self.events.len();
        self.events.emit(VaultEvent::Execute {
            id,
            executed_at: now,
        });

        // Interactions
        self.in_flight = Some(Vec::new());
        let outcome = if call.is_bare_transfer() {
            target.receive(self, &call.payload, call.value)
        } else {
            target.invoke(self, &call.selector, &call.payload, call.value)
        };
        let journal = self.in_flight.take().unwrap_or_default();

        match outcome {
            Ok(()) => {
                tracing::info!(%id, %caller, target = %call.target, value = %call.value, "transaction executed");
                Ok(id)
            }
            Err(reason) => {
                tracing::warn!(%id, error = %reason, undone = journal.len(), "dispatch failed, reverting execution");
                for undo in journal.into_iter().rev() {
                    self.registry.revert(undo);
                }
                self.registry.revert(Undo::Executed(id));
                self.events.truncate(events_len);
                Err(TimelockError::ExecutionFailed(reason))
            }
        }
    }
}
