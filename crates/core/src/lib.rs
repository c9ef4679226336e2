//! Core types for Facets
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityId: Unique identifier for entities
//! - ContractId: Identity of a declared view contract
//! - Value / ValueType / Payload: Attribute payload model
//! - AttributeKey: Attribute address (name + payload type)
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod error;
pub mod types;
pub mod value;

pub use attribute::AttributeKey;
pub use error::{Error, Result};
pub use types::{ContractId, EntityId};
pub use value::{Payload, Value, ValueType};
