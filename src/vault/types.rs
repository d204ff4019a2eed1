//! Core vault types: identities, calls, transaction ids and records.

use crate::serialization::{to_cbor, SerializationError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Domain separator prepended to the canonical call encoding before hashing.
const TX_ID_DOMAIN: &[u8] = b"timelock.tx.v1";

/// Account identity (20 bytes), used for both owners and call targets.
///
/// Serializes as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose last byte is `id` and all others zero. Handy for fixtures.
    pub const fn from_low_u8(id: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = id;
        Self(bytes)
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Address parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Deterministic transaction id (SHA-256 over the canonical call encoding).
///
/// Serializes as a bare hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(s), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// A candidate external call.
///
/// The five fields are exactly the tuple the transaction id commits to. An
/// empty `selector` denotes a bare value transfer to the target's default
/// receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    /// Collaborator to invoke.
    pub target: Address,
    /// Entry point name, e.g. `"f(string)"`. Empty for a bare transfer.
    pub selector: String,
    /// Opaque argument bytes for the entry point.
    pub payload: Vec<u8>,
    /// Native value attached to the call.
    pub value: u128,
    /// Earliest ledger time at which execution is permitted.
    pub exec_timestamp: u64,
}

impl Call {
    pub fn new(
        target: Address,
        selector: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        value: u128,
        exec_timestamp: u64,
    ) -> Self {
        Self {
            target,
            selector: selector.into(),
            payload: payload.into(),
            value,
            exec_timestamp,
        }
    }

    /// Bare value transfer (empty selector and payload).
    pub fn transfer(target: Address, value: u128, exec_timestamp: u64) -> Self {
        Self::new(target, "", Vec::new(), value, exec_timestamp)
    }

    /// True if this call goes to the target's default receiver.
    pub fn is_bare_transfer(&self) -> bool {
        self.selector.is_empty()
    }

    /// Compute the deterministic transaction id for this call.
    pub fn id(&self) -> Result<TxId, SerializationError> {
        let encoded = to_cbor(self)?;
        let mut hasher = Sha256::new();
        hasher.update(TX_ID_DOMAIN);
        hasher.update(&encoded);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Ok(TxId(bytes))
    }
}

/// A queued transaction and its confirmation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TxId,
    pub call: Call,
    pub queued: bool,
    pub executed: bool,
    /// Ledger time at which the record was queued.
    pub queued_at: u64,
    /// Ledger time at which the record was executed.
    pub executed_at: Option<u64>,
    confirmed_by: BTreeSet<Address>,
}

impl TransactionRecord {
    /// Fresh queued record with no confirmations.
    pub(crate) fn queued(id: TxId, call: Call, queued_at: u64) -> Self {
        Self {
            id,
            call,
            queued: true,
            executed: false,
            queued_at,
            executed_at: None,
            confirmed_by: BTreeSet::new(),
        }
    }

    /// Number of owners currently confirming. Always `|confirmed_by|`.
    pub fn confirmations_count(&self) -> usize {
        self.confirmed_by.len()
    }

    /// Owners currently confirming, in address order.
    pub fn confirmed_by(&self) -> impl Iterator<Item = &Address> {
        self.confirmed_by.iter()
    }

    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.confirmed_by.contains(owner)
    }

    /// Queued and not yet executed.
    pub fn is_pending(&self) -> bool {
        self.queued && !self.executed
    }

    /// Returns false if the owner had already confirmed.
    pub(crate) fn add_confirmation(&mut self, owner: Address) -> bool {
        self.confirmed_by.insert(owner)
    }

    /// Returns false if the owner had not confirmed.
    pub(crate) fn remove_confirmation(&mut self, owner: &Address) -> bool {
        self.confirmed_by.remove(owner)
    }

    pub(crate) fn mark_executed(&mut self, at: u64) {
        self.executed = true;
        self.executed_at = Some(at);
    }

    /// Undo `mark_executed` after a failed dispatch.
    pub(crate) fn clear_executed(&mut self) {
        self.executed = false;
        self.executed_at = None;
    }

    pub fn view(&self) -> RecordView {
        RecordView {
            queued: self.queued,
            executed: self.executed,
            confirmations_count: self.confirmations_count(),
        }
    }
}

/// Summary returned by `TimelockVault::get_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub queued: bool,
    pub executed: bool,
    pub confirmations_count: usize,
}
