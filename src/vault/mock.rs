//! Reference external targets for testing and replays.
//!
//! - `RecordingTarget`: one entry point that stores a message, plus a default
//!   receiver; tracks balance and call counts
//! - `RejectingTarget`: fails every call
//! - `ReentrantTarget`: calls back into the vault while being dispatched

use super::traits::{ExternalTarget, TargetError, TimelockResult};
use super::types::{Address, Call, RecordView, TxId};
use super::TimelockVault;

/// Target with a single `f(string)` entry point.
///
/// The payload of `f(string)` is a UTF-8 message. Every accepted call adds
/// its value to `balance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingTarget {
    address: Address,
    balance: u128,
    call_count: u64,
    received_count: u64,
    message: String,
}

impl RecordingTarget {
    /// Selector of the message-setting entry point.
    pub const SET_MESSAGE: &'static str = "f(string)";

    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            call_count: 0,
            received_count: 0,
            message: String::new(),
        }
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Number of successful `f(string)` calls.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Number of bare transfers received.
    pub fn received_count(&self) -> u64 {
        self.received_count
    }

    /// Last message stored by `f(string)`.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn credit(&mut self, value: u128) -> Result<(), TargetError> {
        self.balance = self
            .balance
            .checked_add(value)
            .ok_or_else(|| TargetError::Rejected("balance overflow".to_string()))?;
        Ok(())
    }
}

impl ExternalTarget for RecordingTarget {
    fn address(&self) -> Address {
        self.address
    }

    fn invoke(
        &mut self,
        _vault: &mut TimelockVault,
        selector: &str,
        payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError> {
        if selector != Self::SET_MESSAGE {
            return Err(TargetError::UnknownSelector(selector.to_string()));
        }

        let message = std::str::from_utf8(payload)
            .map_err(|e| TargetError::MalformedPayload(e.to_string()))?;

        self.credit(value)?;
        self.message = message.to_string();
        self.call_count += 1;
        Ok(())
    }

    fn receive(
        &mut self,
        _vault: &mut TimelockVault,
        _payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError> {
        self.credit(value)?;
        self.received_count += 1;
        Ok(())
    }
}

/// Target that refuses every call with a fixed reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectingTarget {
    address: Address,
    reason: String,
    attempts: u32,
}

impl RejectingTarget {
    pub fn new(address: Address, reason: impl Into<String>) -> Self {
        Self {
            address,
            reason: reason.into(),
            attempts: 0,
        }
    }

    /// Number of dispatches received (all of them rejected).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl ExternalTarget for RejectingTarget {
    fn address(&self) -> Address {
        self.address
    }

    fn invoke(
        &mut self,
        _vault: &mut TimelockVault,
        _selector: &str,
        _payload: &[u8],
        _value: u128,
    ) -> Result<(), TargetError> {
        self.attempts += 1;
        Err(TargetError::Rejected(self.reason.clone()))
    }

    fn receive(
        &mut self,
        _vault: &mut TimelockVault,
        _payload: &[u8],
        _value: u128,
    ) -> Result<(), TargetError> {
        self.attempts += 1;
        Err(TargetError::Rejected(self.reason.clone()))
    }
}

/// What a `ReentrantTarget` does to the vault while it is being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reentry {
    /// Execute `call` again, passing itself as the target.
    Execute(Call),
    /// Confirm `id`.
    Confirm(TxId),
    /// Queue `call`.
    Queue(Call),
}

/// Target that re-enters the vault from inside its own dispatch.
///
/// Each dispatch performs the configured `Reentry` as `caller` and records
/// the outcome. With `propagate` set, a failed reentry fails the dispatch
/// (and so reverts the outer execution); otherwise it is swallowed.
#[derive(Debug)]
pub struct ReentrantTarget {
    address: Address,
    caller: Address,
    reentry: Reentry,
    propagate: bool,
    dispatches: u32,
    balance: u128,
    /// Record view of the reentry's id, taken before re-entering.
    observed: Vec<Option<RecordView>>,
    outcomes: Vec<TimelockResult<()>>,
}

impl ReentrantTarget {
    pub fn new(address: Address, caller: Address, reentry: Reentry) -> Self {
        Self {
            address,
            caller,
            reentry,
            propagate: false,
            dispatches: 0,
            balance: 0,
            observed: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Fail the dispatch when the reentry fails.
    pub fn propagating(mut self) -> Self {
        self.propagate = true;
        self
    }

    /// Number of times this target was dispatched to.
    pub fn dispatches(&self) -> u32 {
        self.dispatches
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// What the target saw of the reentry's record at each dispatch.
    pub fn observed(&self) -> &[Option<RecordView>] {
        &self.observed
    }

    /// Outcome of each reentry attempt.
    pub fn outcomes(&self) -> &[TimelockResult<()>] {
        &self.outcomes
    }

    fn reenter(&mut self, vault: &mut TimelockVault, value: u128) -> Result<(), TargetError> {
        self.dispatches += 1;
        self.balance = self.balance.saturating_add(value);

        let caller = self.caller;
        let outcome = match self.reentry.clone() {
            Reentry::Execute(call) => {
                self.observed.push(observe(vault, call.id().ok()));
                vault.execute(&caller, self, &call).map(|_| ())
            }
            Reentry::Confirm(id) => {
                self.observed.push(vault.get_record(&id));
                vault.confirm(&caller, &id).map(|_| ())
            }
            Reentry::Queue(call) => {
                self.observed.push(observe(vault, call.id().ok()));
                vault.add_to_queue(&caller, call).map(|_| ())
            }
        };

        tracing::debug!(target_address = %self.address, ok = outcome.is_ok(), "reentrant vault call");

        match outcome {
            Err(err) if self.propagate => Err(err.into()),
            other => {
                self.outcomes.push(other);
                Ok(())
            }
        }
    }
}

fn observe(vault: &TimelockVault, id: Option<TxId>) -> Option<RecordView> {
    id.and_then(|id| vault.get_record(&id))
}

impl ExternalTarget for ReentrantTarget {
    fn address(&self) -> Address {
        self.address
    }

    fn invoke(
        &mut self,
        vault: &mut TimelockVault,
        _selector: &str,
        _payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError> {
        self.reenter(vault, value)
    }

    fn receive(
        &mut self,
        vault: &mut TimelockVault,
        _payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError> {
        self.reenter(vault, value)
    }
}
