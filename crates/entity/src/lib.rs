//! Entity graph for Facets
//!
//! This crate implements the storage collaborator that views reinterpret:
//! - AttributeContainer: typed attributes keyed by name + payload type
//! - Entity: node handle with children, parent back-reference and type marks
//! - WeakEntity: non-owning handle used by views
//!
//! Views only ever call the primitive operations on [`Entity`]: strict/soft
//! attribute get, add, strict/soft remove, child creation with or without an
//! identity, strict/soft child lookup, and child enumeration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod entity;

pub use attributes::AttributeContainer;
pub use entity::{Entity, WeakEntity};
