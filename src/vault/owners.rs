//! Owner registry.
//!
//! The owner set is fixed at construction. There is no add/remove API; a
//! different owner set means a different vault.

use super::traits::{TimelockError, TimelockResult};
use super::types::Address;
use std::collections::HashSet;

/// Immutable set of authorized identities, kept in construction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRegistry {
    owners: Vec<Address>,
    index: HashSet<Address>,
}

impl OwnerRegistry {
    /// Build the registry. Fails on an empty list or duplicate identities.
    pub fn new(owners: impl IntoIterator<Item = Address>) -> TimelockResult<Self> {
        let mut ordered = Vec::new();
        let mut index = HashSet::new();

        for owner in owners {
            if !index.insert(owner) {
                return Err(TimelockError::InvalidOwnerSet(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
            ordered.push(owner);
        }

        if ordered.is_empty() {
            return Err(TimelockError::InvalidOwnerSet(
                "at least one owner is required".to_string(),
            ));
        }

        Ok(Self {
            owners: ordered,
            index,
        })
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.index.contains(identity)
    }

    pub fn size(&self) -> usize {
        self.owners.len()
    }

    /// Owners in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.owners.iter()
    }

    /// Fail with `NotAnOwner` unless `caller` is registered.
    pub(crate) fn authorize(&self, caller: &Address) -> TimelockResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(TimelockError::NotAnOwner(*caller))
        }
    }
}
