//! Contract validation registry
//!
//! Validation walks a contract's declared methods, resolves a descriptor for
//! every marked method, then recurses depth-first into every referenced
//! contract and every super-contract. An explicit in-progress set is the
//! cycle guard: a contract already being validated further up the walk is
//! treated as resolved, so mutually referential contracts terminate.
//!
//! ## Publication
//!
//! Everything a successful walk learns (schemas, descriptors, default-body
//! invokers) is staged and only published when the whole walk succeeds.
//! Verdicts are written last, so any reader that observes "valid" also
//! observes the descriptors it needs. A failed walk records a verdict for
//! the requested contract only; contracts it passed through stay unknown
//! because their validity may have depended on the failed one.
//!
//! ## Concurrency
//!
//! Concurrent first-time validation of one contract is not coordinated.
//! Both walks compute identical, deterministic results and publish them with
//! plain map inserts, so the final state does not depend on who wins.

use crate::bodies::BodyRegistry;
use crate::dispatch::MethodTable;
use crate::resolver::{self, MethodDescriptor};
use crate::schema::{ContractRef, ContractSchema, MethodBody};
use dashmap::DashMap;
use facets_core::{ContractId, Error, Result};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Key of one published method descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    /// Declaring contract
    pub contract: ContractId,
    /// Method name
    pub method: &'static str,
}

impl MethodKey {
    /// Key of `method` declared on `contract`
    pub fn new(contract: ContractId, method: &'static str) -> Self {
        Self { contract, method }
    }
}

/// Permanent outcome of validating one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The contract and everything it reaches validated
    Valid,
    /// Validation failed for the given reason
    Invalid(Arc<str>),
}

impl Verdict {
    /// Whether this is `Valid`
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// A contract that passed validation, with its schema
#[derive(Debug)]
pub struct ValidatedContract {
    /// Contract handle
    pub contract: ContractRef,
    /// Schema built once at validation
    pub schema: ContractSchema,
}

struct Staged {
    contract: ContractRef,
    schema: ContractSchema,
    descriptors: Vec<(&'static str, MethodDescriptor)>,
}

type Walk = std::result::Result<(), String>;

/// Registry of verdicts, schemas and descriptors
#[derive(Debug, Default)]
pub struct ContractRegistry {
    verdicts: DashMap<ContractId, Verdict>,
    contracts: DashMap<ContractId, Arc<ValidatedContract>>,
    descriptors: DashMap<MethodKey, Arc<MethodDescriptor>>,
    tables: DashMap<ContractId, Arc<MethodTable>>,
}

impl ContractRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `contract`, publishing its descriptors on success
    ///
    /// The root contract is always valid. Verdicts are permanent: a second
    /// call for the same contract is a map lookup.
    ///
    /// # Errors
    ///
    /// `InvalidViewContract` naming the first rejection found.
    pub fn validate(&self, contract: ContractRef, bodies: &BodyRegistry) -> Result<()> {
        if contract.is_root() {
            return Ok(());
        }
        if let Some(verdict) = self.verdicts.get(&contract.id()) {
            trace!(target: "facets::validate", contract = contract.name(), "Verdict cache hit");
            return match verdict.value() {
                Verdict::Valid => Ok(()),
                Verdict::Invalid(reason) => {
                    Err(Error::invalid_contract(contract.name(), reason.to_string()))
                }
            };
        }

        debug!(target: "facets::validate", contract = contract.name(), "Validating contract");
        let mut in_progress = FxHashSet::default();
        let mut staged = Vec::new();
        match self.walk(contract, &mut in_progress, &mut staged) {
            Ok(()) => {
                let count = staged.len();
                self.commit(staged, bodies);
                debug!(
                    target: "facets::validate",
                    contract = contract.name(),
                    validated = count,
                    "Contract valid"
                );
                Ok(())
            }
            Err(reason) => {
                warn!(
                    target: "facets::validate",
                    contract = contract.name(),
                    reason = %reason,
                    "Contract rejected"
                );
                self.verdicts
                    .insert(contract.id(), Verdict::Invalid(Arc::from(reason.as_str())));
                Err(Error::invalid_contract(contract.name(), reason))
            }
        }
    }

    fn walk(
        &self,
        contract: ContractRef,
        in_progress: &mut FxHashSet<ContractId>,
        staged: &mut Vec<Staged>,
    ) -> Walk {
        if contract.is_root() {
            return Ok(());
        }
        match self.verdicts.get(&contract.id()).map(|v| v.value().clone()) {
            Some(Verdict::Valid) => return Ok(()),
            Some(Verdict::Invalid(reason)) => {
                return Err(format!("{} is invalid: {}", contract.name(), reason))
            }
            None => {}
        }

        let schema = contract.schema();
        if !reaches_root(&schema, &mut FxHashSet::default()) {
            return Err(format!("{} does not extend the entity root", contract.name()));
        }

        let mut descriptors = Vec::with_capacity(schema.methods.len());
        let mut referenced = Vec::new();
        let mut seen = FxHashSet::default();

        for method in &schema.methods {
            if !seen.insert(method.name) {
                return Err(format!("{}::{} is declared twice", contract.name(), method.name));
            }
            match (method.markers.as_slice(), method.body) {
                ([], MethodBody::Abstract) => {
                    return Err(format!(
                        "{}::{} is abstract and carries no marker",
                        contract.name(),
                        method.name
                    ));
                }
                ([], _) => continue,
                ([marker], MethodBody::Abstract) => {
                    let desc = resolver::resolve(method, marker)
                        .map_err(|reason| format!("{}::{}: {}", contract.name(), method.name, reason))?;
                    if let Some(target) = desc.contract() {
                        referenced.push(target);
                    }
                    descriptors.push((method.name, desc));
                }
                ([_], _) => {
                    return Err(format!(
                        "{}::{} is marked and also has a body",
                        contract.name(),
                        method.name
                    ));
                }
                (markers, _) => {
                    return Err(format!(
                        "{}::{} carries {} markers",
                        contract.name(),
                        method.name,
                        markers.len()
                    ));
                }
            }
        }

        in_progress.insert(contract.id());

        referenced.extend(schema.extends.iter().copied());
        for next in referenced {
            if in_progress.contains(&next.id()) {
                continue;
            }
            self.walk(next, in_progress, staged)?;
        }

        staged.push(Staged {
            contract,
            schema,
            descriptors,
        });
        Ok(())
    }

    fn commit(&self, staged: Vec<Staged>, bodies: &BodyRegistry) {
        let mut ids = Vec::with_capacity(staged.len());
        for entry in staged {
            let id = entry.contract.id();
            for (method, desc) in entry.descriptors {
                self.descriptors
                    .insert(MethodKey::new(id, method), Arc::new(desc));
            }
            bodies.ensure(entry.contract, &entry.schema);
            self.contracts.insert(
                id,
                Arc::new(ValidatedContract {
                    contract: entry.contract,
                    schema: entry.schema,
                }),
            );
            ids.push(id);
        }
        for id in ids {
            self.verdicts.insert(id, Verdict::Valid);
        }
    }

    /// Recorded verdict for `contract`, if it was ever validated
    pub fn verdict(&self, contract: ContractId) -> Option<Verdict> {
        self.verdicts.get(&contract).map(|v| v.value().clone())
    }

    /// Whether `contract` is known valid
    pub fn is_valid(&self, contract: ContractId) -> bool {
        self.verdict(contract).map_or(false, |v| v.is_valid())
    }

    /// Published descriptor of a marked method
    pub fn descriptor(&self, key: &MethodKey) -> Option<Arc<MethodDescriptor>> {
        self.descriptors.get(key).map(|d| d.value().clone())
    }

    /// Validated contract entry
    pub fn contract(&self, contract: ContractId) -> Option<Arc<ValidatedContract>> {
        self.contracts.get(&contract).map(|c| c.value().clone())
    }

    /// Handles of every validated contract
    pub fn validated(&self) -> Vec<ContractRef> {
        self.contracts.iter().map(|c| c.value().contract).collect()
    }

    /// Number of contracts known valid
    pub fn validated_count(&self) -> usize {
        self.contracts.len()
    }

    /// Number of published descriptors
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Method table of a valid contract, built on first request
    ///
    /// `None` if the contract is not known valid.
    pub fn method_table(&self, contract: ContractRef) -> Option<Arc<MethodTable>> {
        if let Some(table) = self.tables.get(&contract.id()) {
            return Some(table.value().clone());
        }
        if !contract.is_root() && !self.is_valid(contract.id()) {
            return None;
        }
        let table = Arc::new(MethodTable::build(self, contract));
        let entry = self.tables.entry(contract.id()).or_insert(table);
        Some(entry.value().clone())
    }

    /// `contract` followed by all of its non-root ancestors
    ///
    /// Uses published schemas; ancestors that were never validated are
    /// skipped.
    pub fn lineage(&self, contract: ContractRef) -> Vec<ContractId> {
        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![contract];
        while let Some(next) = stack.pop() {
            if next.is_root() || !visited.insert(next.id()) {
                continue;
            }
            out.push(next.id());
            if let Some(entry) = self.contract(next.id()) {
                stack.extend(entry.schema.extends.iter().rev().copied());
            }
        }
        out
    }
}

/// Whether the extends graph of `schema` reaches the root contract
fn reaches_root(schema: &ContractSchema, visited: &mut FxHashSet<ContractId>) -> bool {
    for parent in &schema.extends {
        if parent.is_root() {
            return true;
        }
        if visited.insert(parent.id()) && reaches_root(&parent.schema(), visited) {
            return true;
        }
    }
    false
}
