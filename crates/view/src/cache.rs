//! View cache
//!
//! At most one committed view per (entity identity, contract) key. Lookup
//! and insertion go through DashMap's entry API, so racing callers for one
//! key all observe the instance built by whichever of them took the shard
//! lock first.
//!
//! Invalidation only discards views. The entities they were bound to are
//! untouched and get a fresh view on the next request.
//!
//! A closed cache refuses inserts. The check happens under the entry lock,
//! so an insert racing `close` is either refused or swept.

use crate::config::ViewConfig;
use crate::dispatch::View;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use facets_core::{ContractId, EntityId};
use facets_entity::Entity;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

type CacheKey = (EntityId, ContractId);

/// Table of generated views
#[derive(Debug)]
pub struct ViewCache {
    views: DashMap<CacheKey, View>,
    closed: AtomicBool,
}

impl ViewCache {
    /// Create a cache sized per `config`, which must already be validated
    pub(crate) fn with_config(config: &ViewConfig) -> Self {
        let views = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };
        Self {
            views,
            closed: AtomicBool::new(false),
        }
    }

    /// Cached view of `entity` as `contract`, inserting `make()` if absent
    ///
    /// A cached view bound to a different entity with the same identity
    /// (the earlier entity was dropped and its identity reused) is replaced.
    /// Once the cache is closed `make()` is returned without being stored.
    pub fn get_or_insert_with(
        &self,
        entity: &Entity,
        contract: ContractId,
        make: impl FnOnce() -> View,
    ) -> View {
        match self.views.entry((entity.id(), contract)) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_bound_to(entity) {
                    return occupied.get().clone();
                }
                let view = make();
                if self.is_closed() {
                    occupied.remove();
                    return view;
                }
                occupied.insert(view.clone());
                debug!(
                    target: "facets::cache",
                    entity = %entity.id(),
                    contract = contract.name(),
                    "Replaced view of a dropped entity"
                );
                view
            }
            Entry::Vacant(vacant) => {
                let view = make();
                if self.is_closed() {
                    return view;
                }
                vacant.insert(view.clone());
                debug!(
                    target: "facets::cache",
                    entity = %entity.id(),
                    contract = contract.name(),
                    "Constructed view"
                );
                view
            }
        }
    }

    /// Refuse further inserts and discard every view
    pub(crate) fn close(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        self.clear_all()
    }

    /// Whether the cache was closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Discard every view; returns how many were removed
    pub fn clear_all(&self) -> usize {
        let removed = self.sweep(|_| true);
        debug!(target: "facets::cache", removed, "Cleared all views");
        removed
    }

    /// Discard the views of `contract` for every entity
    pub fn clear_contract(&self, contract: ContractId) -> usize {
        let removed = self.sweep(|(_, c)| *c == contract);
        debug!(
            target: "facets::cache",
            contract = contract.name(),
            removed,
            "Cleared views of contract"
        );
        removed
    }

    /// Discard the views of `entity` for every contract
    pub fn clear_entity(&self, entity: EntityId) -> usize {
        let removed = self.sweep(|(e, _)| *e == entity);
        debug!(target: "facets::cache", entity = %entity, removed, "Cleared views of entity");
        removed
    }

    /// Discard one view; returns whether it was cached
    pub fn clear_one(&self, entity: EntityId, contract: ContractId) -> bool {
        self.views.remove(&(entity, contract)).is_some()
    }

    /// Number of cached views
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn sweep(&self, mut doomed: impl FnMut(&CacheKey) -> bool) -> usize {
        let mut removed = 0;
        self.views.retain(|key, _| {
            if doomed(key) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}
