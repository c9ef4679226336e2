//! Typed capability views over entities
//!
//! This crate lets callers declare a contract (a set of named methods, each
//! routed by a marker to one primitive entity operation) and then look at
//! any entity through it:
//! - schema: contract declarations and the universal root
//! - resolver: per-method descriptor resolution and shape rules
//! - registry: recursive, cycle-safe contract validation
//! - bodies: invokers for provided method bodies
//! - dispatch: the per-view router, dynamic arguments and replies
//! - cache: one view per (entity, contract)
//! - engine: the facade tying the above together
//! - config: `facets.toml` loading
//!
//! Validation happens once per contract and is permanent. A contract that
//! fails never yields a view.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bodies;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use bodies::{BodyInvoker, BodyRegistry};
pub use cache::ViewCache;
pub use config::{ViewConfig, CONFIG_FILE_NAME};
pub use dispatch::{Arg, MethodTable, Reply, Route, View, ViewStream};
pub use engine::ViewEngine;
pub use registry::{ContractRegistry, MethodKey, ValidatedContract, Verdict};
pub use resolver::{MarkerFamily, Membership, MethodDescriptor, Mode, Target};
pub use schema::{
    Contract, ContractRef, ContractSchema, Marker, MethodBody, MethodSchema, PassThrough,
    ProvidedFn, Root, StaticFn, TypeRef,
};
