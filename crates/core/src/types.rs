//! Identity types for Facets
//!
//! This module defines the two identities everything else is keyed by:
//! - EntityId: Unique identifier for an entity node
//! - ContractId: Identity of a declared view contract

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Unique identifier for an entity
///
/// An EntityId is a wrapper around a UUID v4. It is opaque, equality
/// comparable and can be supplied by callers when creating children with
/// an explicit identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Create a new random EntityId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an EntityId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse an EntityId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this EntityId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a view contract
///
/// Contracts are declared as Rust types, so the `TypeId` of the declaring
/// type is the identity. The name is carried along for diagnostics only and
/// takes no part in equality or hashing.
#[derive(Clone, Copy)]
pub struct ContractId {
    type_id: TypeId,
    name: &'static str,
}

impl ContractId {
    /// Contract identity of the declaring type `T`
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
        }
    }

    /// Display name of the contract
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The `TypeId` of the declaring type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.name)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
