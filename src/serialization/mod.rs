//! CBOR serialization for canonical call encoding.
//!
//! Transaction ids are digests over these bytes, so encoding must be:
//! - Deterministic (same value, same bytes)
//! - Self-delimiting (no two distinct calls share an encoding)
//! - Stable across releases; new fields use #[serde(default)]

use serde::Serialize;
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}
