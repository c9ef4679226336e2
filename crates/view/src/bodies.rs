//! Default-body invokers
//!
//! A contract's provided methods are plain Rust `fn`s taking the view as
//! receiver. The invoker for a contract collects them once and runs them
//! against whichever view the call arrived on, so a provided body that
//! calls sibling methods re-enters the dispatcher through that same view.

use crate::dispatch::{Arg, Reply, View};
use crate::schema::{ContractRef, ContractSchema, MethodBody, ProvidedFn};
use dashmap::DashMap;
use facets_core::{ContractId, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Provided bodies of one contract
pub struct BodyInvoker {
    contract: ContractRef,
    bodies: FxHashMap<&'static str, ProvidedFn>,
}

impl BodyInvoker {
    /// Collect the provided bodies declared directly on `schema`
    fn from_schema(contract: ContractRef, schema: &ContractSchema) -> Self {
        let bodies = schema
            .methods
            .iter()
            .filter_map(|m| match m.body {
                MethodBody::Provided(body) => Some((m.name, body)),
                _ => None,
            })
            .collect();
        Self { contract, bodies }
    }

    /// Contract the bodies belong to
    pub fn contract(&self) -> ContractRef {
        self.contract
    }

    /// Whether `method` has a provided body here
    pub fn contains(&self, method: &str) -> bool {
        self.bodies.contains_key(method)
    }

    /// Number of provided bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether there are no provided bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Run `method` with `view` as receiver; `None` if it has no body here
    pub fn invoke(&self, method: &str, view: &View, args: &[Arg]) -> Option<Result<Reply>> {
        self.bodies.get(method).map(|body| body(view, args))
    }
}

impl std::fmt::Debug for BodyInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&str> = self.bodies.keys().copied().collect();
        methods.sort_unstable();
        f.debug_struct("BodyInvoker")
            .field("contract", &self.contract)
            .field("methods", &methods)
            .finish()
    }
}

/// Per-contract invokers, built once and kept for the engine's lifetime
#[derive(Debug, Default)]
pub struct BodyRegistry {
    invokers: DashMap<ContractId, Arc<BodyInvoker>>,
}

impl BodyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoker for `contract`, building it on first request
    ///
    /// Contracts without provided bodies get no invoker.
    pub fn ensure(&self, contract: ContractRef, schema: &ContractSchema) -> Option<Arc<BodyInvoker>> {
        if let Some(existing) = self.invokers.get(&contract.id()) {
            return Some(existing.value().clone());
        }
        let invoker = BodyInvoker::from_schema(contract, schema);
        if invoker.is_empty() {
            return None;
        }
        let entry = self
            .invokers
            .entry(contract.id())
            .or_insert_with(|| Arc::new(invoker));
        Some(entry.value().clone())
    }

    /// Previously built invoker for `contract`
    pub fn invoker(&self, contract: ContractId) -> Option<Arc<BodyInvoker>> {
        self.invokers.get(&contract).map(|i| i.value().clone())
    }

    /// Number of contracts with an invoker
    pub fn len(&self) -> usize {
        self.invokers.len()
    }

    /// Whether no invoker has been built
    pub fn is_empty(&self) -> bool {
        self.invokers.is_empty()
    }
}
