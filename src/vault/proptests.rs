//! Property-based tests for the vault state machine
//!
//! Tests for:
//! - Delay: short delays never create records
//! - Reversibility: confirm then cancel restores record state
//! - Safety: execution only at unanimity and after the timestamp, once

use super::mock::RecordingTarget;
use super::traits::{ExternalTarget, TimelockError};
use super::types::{Address, Call};
use super::{ManualClock, TimelockVault, MIN_DELAY};
use proptest::prelude::*;
use std::sync::Arc;

const START: u64 = 10_000;

fn owner(id: u8) -> Address {
    Address::from_low_u8(id + 1)
}

fn vault_with(owner_count: u8) -> (TimelockVault, ManualClock) {
    let clock = ManualClock::new(START);
    let vault = TimelockVault::new((0..owner_count).map(owner), Arc::new(clock.clone()))
        .expect("distinct owners");
    (vault, clock)
}

#[derive(Debug, Clone)]
enum Op {
    Queue { delay: u64, value: u128 },
    Confirm { owner: u8, tx: usize },
    Cancel { owner: u8, tx: usize },
    Advance(u64),
    Execute { owner: u8, tx: usize },
}

fn op_strategy(owner_count: u8) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..150, 0u128..1_000).prop_map(|(delay, value)| Op::Queue { delay, value }),
        (0..owner_count + 1, 0usize..8).prop_map(|(owner, tx)| Op::Confirm { owner, tx }),
        (0..owner_count + 1, 0usize..8).prop_map(|(owner, tx)| Op::Cancel { owner, tx }),
        (0u64..90).prop_map(Op::Advance),
        (0..owner_count + 1, 0usize..8).prop_map(|(owner, tx)| Op::Execute { owner, tx }),
    ]
}

proptest! {
    /// Property test: Delay
    /// Any execution time earlier than now + MIN_DELAY is rejected and leaves no trace
    #[test]
    fn prop_short_delay_rejected(shortfall in 1u64..=MIN_DELAY, value in any::<u128>()) {
        let (mut vault, _clock) = vault_with(2);
        let call = Call::transfer(Address::from_low_u8(0xcc), value, START + MIN_DELAY - shortfall);
        let id = call.id().unwrap();

        let result = vault.add_to_queue(&owner(0), call);
        let rejected = matches!(result, Err(TimelockError::IncorrectExecutionTime { .. }));
        prop_assert!(rejected);
        prop_assert!(vault.get_record(&id).is_none());
        prop_assert!(vault.events().is_empty());
    }

    /// Property test: Reversibility
    /// For any set of prior confirmations, confirm + cancel by another owner is a no-op
    #[test]
    fn prop_confirm_cancel_identity(
        owner_count in 2u8..6,
        prior in proptest::collection::vec(any::<bool>(), 6),
        pick in 0u8..6,
    ) {
        let (mut vault, _clock) = vault_with(owner_count);
        let call = Call::transfer(Address::from_low_u8(0xcc), 1, START + MIN_DELAY);
        let id = vault.add_to_queue(&owner(0), call).unwrap();

        let actor = pick % owner_count;
        for i in 0..owner_count {
            if prior[i as usize] && i != actor {
                vault.confirm(&owner(i), &id).unwrap();
            }
        }

        let before = vault.record(&id).unwrap().clone();
        vault.confirm(&owner(actor), &id).unwrap();
        vault.cancel_confirmation(&owner(actor), &id).unwrap();

        prop_assert_eq!(vault.record(&id).unwrap(), &before);
        prop_assert!(!vault.get_confirmation(&id, &owner(actor)));
    }

    /// Property test: Safety
    /// Under any interleaving, an execution succeeds only when every owner
    /// confirmed and the timestamp passed, and never twice for one id
    #[test]
    fn prop_execution_safety(
        owner_count in 1u8..4,
        ops in proptest::collection::vec(op_strategy(3), 1..60),
    ) {
        let (mut vault, clock) = vault_with(owner_count);
        let mut target = RecordingTarget::new(Address::from_low_u8(0xcc));
        let mut calls: Vec<Call> = Vec::new();
        let mut executions = 0u64;

        for op in ops {
            match op {
                Op::Queue { delay, value } => {
                    let call = Call::new(
                        target.address(),
                        RecordingTarget::SET_MESSAGE,
                        format!("v{}", value).into_bytes(),
                        value,
                        vault.now() + delay,
                    );
                    let result = vault.add_to_queue(&owner(0), call.clone());
                    if delay < MIN_DELAY {
                        prop_assert!(result.is_err());
                    } else if result.is_ok() {
                        calls.push(call);
                    }
                }
                Op::Confirm { owner: o, tx } => {
                    if let Some(call) = calls.get(tx) {
                        let _ = vault.confirm(&owner(o), &call.id().unwrap());
                    }
                }
                Op::Cancel { owner: o, tx } => {
                    if let Some(call) = calls.get(tx) {
                        let _ = vault.cancel_confirmation(&owner(o), &call.id().unwrap());
                    }
                }
                Op::Advance(secs) => {
                    clock.advance(secs);
                }
                Op::Execute { owner: o, tx } => {
                    if let Some(call) = calls.get(tx) {
                        let id = call.id().unwrap();
                        let before = vault.get_record(&id).unwrap();
                        let result = vault.execute(&owner(o), &mut target, call);

                        if result.is_ok() {
                            executions += 1;
                            prop_assert!(o < owner_count);
                            prop_assert!(!before.executed);
                            prop_assert_eq!(before.confirmations_count, owner_count as usize);
                            prop_assert!(vault.now() >= call.exec_timestamp);
                        } else {
                            prop_assert_eq!(vault.get_record(&id).unwrap(), before);
                        }
                    }
                }
            }

            for record in vault.registry().iter() {
                prop_assert!(record.queued);
                prop_assert!(record.confirmations_count() <= owner_count as usize);
                prop_assert_eq!(record.confirmed_by().count(), record.confirmations_count());
            }
        }

        prop_assert_eq!(target.call_count(), executions);
        let executed = vault.registry().iter().filter(|r| r.executed).count() as u64;
        prop_assert_eq!(executed, executions);
    }
}
