//! Timelock - Multi-Owner Time-Locked Transaction Vault
//!
//! A fixed set of owners queues external calls, confirms them one owner at a
//! time, and executes a call only after its delay has elapsed and every owner
//! has confirmed.
//!
//! Key principles:
//! - Owner set and threshold fixed at construction
//! - Deterministic transaction ids (SHA-256 over canonical CBOR)
//! - Checks-effects-interactions on every external dispatch
//! - Failed dispatches revert the whole execution

pub mod serialization;
pub mod vault;
