//! Per-owner confirmations on queued transactions.
//!
//! Confirmations are a set of owners per record; the count is the set size.
//! Cancelling only withdraws one owner's confirmation. It never dequeues the
//! record or changes its execution time.

use super::events::VaultEvent;
use super::registry::Undo;
use super::traits::{TimelockError, TimelockResult};
use super::types::{Address, TxId};
use super::TimelockVault;

impl TimelockVault {
    /// Record `caller`'s confirmation of a queued transaction.
    ///
    /// Fails with `NotAnOwner`, `UnknownId`, `AlreadyExecuted` or
    /// `AlreadyConfirmed`. Returns the new confirmation count.
    pub fn confirm(&mut self, caller: &Address, id: &TxId) -> TimelockResult<usize> {
        self.owners.authorize(caller)?;

        let record = self.registry.pending_mut(id)?;
        if !record.add_confirmation(*caller) {
            return Err(TimelockError::AlreadyConfirmed {
                id: *id,
                owner: *caller,
            });
        }
        let count = record.confirmations_count();
        self.journal(Undo::Confirmed(*id, *caller));

        self.events.emit(VaultEvent::Confirm {
            id: *id,
            owner: *caller,
        });
        tracing::debug!(%id, owner = %caller, count, "confirmation added");
        Ok(count)
    }

    /// Withdraw `caller`'s confirmation.
    ///
    /// Fails with `NotAnOwner`, `UnknownId`, `AlreadyExecuted` or
    /// `NotConfirmed`. Returns the new confirmation count.
    pub fn cancel_confirmation(&mut self, caller: &Address, id: &TxId) -> TimelockResult<usize> {
        self.owners.authorize(caller)?;

        let record = self.registry.pending_mut(id)?;
        if !record.remove_confirmation(caller) {
            return Err(TimelockError::NotConfirmed {
                id: *id,
                owner: *caller,
            });
        }
        let count = record.confirmations_count();
        self.journal(Undo::Cancelled(*id, *caller));

        self.events.emit(VaultEvent::CancelConfirmation {
            id: *id,
            owner: *caller,
        });
        tracing::debug!(%id, owner = %caller, count, "confirmation cancelled");
        Ok(count)
    }

    /// Whether `identity` currently confirms `id`. False for unknown ids or
    /// identities; never fails.
    pub fn get_confirmation(&self, id: &TxId, identity: &Address) -> bool {
        self.registry
            .get(id)
            .is_some_and(|record| record.is_confirmed_by(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::test_support::*;
    use crate::vault::types::Call;

    fn queued(vault: &mut TimelockVault) -> TxId {
        let call = Call::new(
            Address::from_low_u8(0xcc),
            "f(string)",
            b"hello".to_vec(),
            1,
            START + 60,
        );
        vault.add_to_queue(&owner_a(), call).unwrap()
    }

    #[test]
    fn test_confirm_counts_owners() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);

        assert_eq!(vault.confirm(&owner_a(), &id).unwrap(), 1);
        assert_eq!(vault.confirm(&owner_b(), &id).unwrap(), 2);
        assert_eq!(vault.get_record(&id).unwrap().confirmations_count, 2);
        assert!(vault.get_confirmation(&id, &owner_a()));
        assert!(vault.get_confirmation(&id, &owner_b()));
    }

    #[test]
    fn test_double_confirm_fails_without_change() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);
        vault.confirm(&owner_a(), &id).unwrap();
        let events_before = vault.events().len();

        let err = vault.confirm(&owner_a(), &id).unwrap_err();
        assert!(matches!(err, TimelockError::AlreadyConfirmed { owner, .. } if owner == owner_a()));
        assert_eq!(vault.get_record(&id).unwrap().confirmations_count, 1);
        assert_eq!(vault.events().len(), events_before);
    }

    #[test]
    fn test_confirm_then_cancel_is_identity() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);
        vault.confirm(&owner_b(), &id).unwrap();

        let before = vault.record(&id).unwrap().clone();
        vault.confirm(&owner_a(), &id).unwrap();
        vault.cancel_confirmation(&owner_a(), &id).unwrap();

        assert_eq!(vault.record(&id).unwrap(), &before);
        assert!(!vault.get_confirmation(&id, &owner_a()));
        assert!(vault.get_confirmation(&id, &owner_b()));
    }

    #[test]
    fn test_cancel_without_confirm_fails() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);

        let err = vault.cancel_confirmation(&owner_a(), &id).unwrap_err();
        assert!(matches!(err, TimelockError::NotConfirmed { .. }));
    }

    #[test]
    fn test_unknown_id() {
        let (mut vault, _clock) = vault();
        let id = TxId::from_bytes([7u8; 32]);

        assert!(matches!(
            vault.confirm(&owner_a(), &id),
            Err(TimelockError::UnknownId(_))
        ));
        assert!(matches!(
            vault.cancel_confirmation(&owner_a(), &id),
            Err(TimelockError::UnknownId(_))
        ));
        assert!(!vault.get_confirmation(&id, &owner_a()));
    }

    #[test]
    fn test_non_owner_rejected() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);

        assert!(matches!(
            vault.confirm(&stranger(), &id),
            Err(TimelockError::NotAnOwner(_))
        ));
        assert!(matches!(
            vault.cancel_confirmation(&stranger(), &id),
            Err(TimelockError::NotAnOwner(_))
        ));
        assert!(!vault.get_confirmation(&id, &stranger()));
    }

    #[test]
    fn test_confirmation_events() {
        let (mut vault, _clock) = vault();
        let id = queued(&mut vault);
        vault.drain_events();

        vault.confirm(&owner_a(), &id).unwrap();
        vault.cancel_confirmation(&owner_a(), &id).unwrap();

        assert_eq!(
            vault.drain_events(),
            vec![
                VaultEvent::Confirm {
                    id,
                    owner: owner_a()
                },
                VaultEvent::CancelConfirmation {
                    id,
                    owner: owner_a()
                },
            ]
        );
    }
}
