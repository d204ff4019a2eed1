//! Vault Trait Abstractions and Errors
//!
//! `ExternalTarget` is the seam to the collaborator invoked on execution.
//! The reference targets in `mock` implement it for tests and replays.

use super::types::{Address, TxId};
use super::TimelockVault;
use crate::serialization::SerializationError;

/// Result type for vault operations
pub type TimelockResult<T> = Result<T, TimelockError>;

/// Broad error category, used for reporting and by callers that only care
/// about the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Readiness,
    Threshold,
    Execution,
    Internal,
}

/// Vault errors
#[derive(Debug, thiserror::Error)]
pub enum TimelockError {
    #[error("Incorrect execution time: {exec_timestamp} is earlier than {earliest_allowed}")]
    IncorrectExecutionTime {
        exec_timestamp: u64,
        earliest_allowed: u64,
    },

    #[error("Transaction already queued: {0}")]
    AlreadyQueued(TxId),

    #[error("Invalid owner set: {0}")]
    InvalidOwnerSet(String),

    #[error("Not an owner: {0}")]
    NotAnOwner(Address),

    #[error("Unknown transaction id: {0}")]
    UnknownId(TxId),

    #[error("Transaction already executed: {0}")]
    AlreadyExecuted(TxId),

    #[error("Transaction {id} already confirmed by {owner}")]
    AlreadyConfirmed { id: TxId, owner: Address },

    #[error("Transaction {id} not confirmed by {owner}")]
    NotConfirmed { id: TxId, owner: Address },

    #[error("Target handle {actual} does not match queued target {expected}")]
    TargetMismatch { expected: Address, actual: Address },

    #[error("Not ready yet: ledger time {now} is before {exec_timestamp}")]
    NotReadyYet { now: u64, exec_timestamp: u64 },

    #[error("Cannot execute {0} while another execution is dispatching")]
    ExecutionInProgress(TxId),

    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },

    #[error("Execution failed: {0}")]
    ExecutionFailed(#[source] TargetError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] SerializationError),
}

impl TimelockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IncorrectExecutionTime { .. } | Self::AlreadyQueued(_) | Self::InvalidOwnerSet(_) => {
                ErrorKind::Validation
            }
            Self::NotAnOwner(_) => ErrorKind::Authorization,
            Self::UnknownId(_)
            | Self::AlreadyExecuted(_)
            | Self::AlreadyConfirmed { .. }
            | Self::NotConfirmed { .. }
            | Self::TargetMismatch { .. }
            | Self::ExecutionInProgress(_) => ErrorKind::State,
            Self::NotReadyYet { .. } => ErrorKind::Readiness,
            Self::InsufficientConfirmations { .. } => ErrorKind::Threshold,
            Self::ExecutionFailed(_) => ErrorKind::Execution,
            Self::Encoding(_) => ErrorKind::Internal,
        }
    }
}

/// Failure reported by an external target.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Unknown selector: {0}")]
    UnknownSelector(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Call rejected: {0}")]
    Rejected(String),

    /// A reentrant call into the vault failed and the target propagated it.
    #[error("Vault call failed: {0}")]
    Vault(Box<TimelockError>),
}

impl From<TimelockError> for TargetError {
    fn from(err: TimelockError) -> Self {
        Self::Vault(Box::new(err))
    }
}

/// External collaborator invoked by `TimelockVault::execute`.
///
/// Both entry points receive the vault itself, so a target may call back
/// into `confirm`, `cancel_confirmation`, `add_to_queue` or `execute` before
/// returning. By the time either method runs, the record being executed is
/// already marked executed. A nested `execute` is always refused: the same
/// id fails with `AlreadyExecuted`, any other id with `ExecutionInProgress`.
/// Returning an error reverts the whole execution, including the queue and
/// confirmation changes the target made.
pub trait ExternalTarget {
    /// Address the target is reachable at. Must match the queued `Call::target`.
    fn address(&self) -> Address;

    /// Named entry point (non-empty selector).
    fn invoke(
        &mut self,
        vault: &mut TimelockVault,
        selector: &str,
        payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError>;

    /// Default receiver (empty selector). `payload` is passed through as queued.
    fn receive(
        &mut self,
        vault: &mut TimelockVault,
        payload: &[u8],
        value: u128,
    ) -> Result<(), TargetError>;
}
