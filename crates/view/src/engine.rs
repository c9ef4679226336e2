//! View engine
//!
//! [`ViewEngine`] owns one validation registry, one default-body registry
//! and one view cache. Views hold a handle to the same shared state, which
//! is how a view creates and caches views of the children it hands out.
//!
//! Dropping the engine clears its view table. Views still held by callers
//! keep working afterwards, but nothing they produce is cached any more.

use crate::bodies::BodyRegistry;
use crate::cache::ViewCache;
use crate::config::ViewConfig;
use crate::dispatch::{MethodTable, View};
use crate::registry::{ContractRegistry, Verdict};
use crate::schema::{Contract, ContractRef, Root};
use facets_core::{Error, Result};
use facets_entity::Entity;
use std::any::Any;
use std::sync::Arc;

/// State shared by an engine and every view it built
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) registry: ContractRegistry,
    pub(crate) bodies: BodyRegistry,
    pub(crate) cache: ViewCache,
    config: ViewConfig,
}

impl Shared {
    fn new(config: ViewConfig) -> Self {
        Self {
            registry: ContractRegistry::new(),
            bodies: BodyRegistry::new(),
            cache: ViewCache::with_config(&config),
            config,
        }
    }

    fn caching(&self) -> bool {
        self.config.cache_views && !self.cache.is_closed()
    }

    fn validate(&self, contract: ContractRef) -> Result<()> {
        self.registry.validate(contract, &self.bodies)
    }

    /// Method table of `contract`, validating it first
    pub(crate) fn table(&self, contract: ContractRef) -> Result<Arc<MethodTable>> {
        self.validate(contract)?;
        self.registry
            .method_table(contract)
            .ok_or_else(|| Error::invalid_contract(contract.name(), "not validated"))
    }

    /// Fresh view that is never registered in the cache
    pub(crate) fn fresh_view(self: &Arc<Self>, entity: &Entity, contract: ContractRef) -> Result<View> {
        let table = self.table(contract)?;
        Ok(View::new(entity, contract, table, Arc::clone(self)))
    }

    /// Cached view, or a fresh one when caching is off
    pub(crate) fn cached_view(self: &Arc<Self>, entity: &Entity, contract: ContractRef) -> Result<View> {
        let table = self.table(contract)?;
        Ok(self.view_with(entity, contract, &table))
    }

    /// Cached view built from an already resolved table
    pub(crate) fn view_with(
        self: &Arc<Self>,
        entity: &Entity,
        contract: ContractRef,
        table: &Arc<MethodTable>,
    ) -> View {
        let make = || View::new(entity, contract, Arc::clone(table), Arc::clone(self));
        if !self.caching() {
            return make();
        }
        self.cache.get_or_insert_with(entity, contract.id(), make)
    }
}

/// Entry point for validating contracts and viewing entities through them
///
/// # Example
///
/// ```
/// use facets_entity::Entity;
/// use facets_view::{ContractRef, ViewEngine};
///
/// let engine = ViewEngine::new();
/// let entity = Entity::new();
/// let view = engine.get_or_create(&entity, ContractRef::root()).unwrap();
/// assert_eq!(view.id().unwrap(), entity.id());
/// ```
#[derive(Debug)]
pub struct ViewEngine {
    shared: Arc<Shared>,
}

impl ViewEngine {
    /// Engine with the default configuration
    pub fn new() -> Self {
        Self::from_parts(ViewConfig::default())
    }

    /// Engine with a validated configuration
    ///
    /// # Errors
    ///
    /// `Config` if the configuration is out of range.
    pub fn with_config(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: ViewConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ViewConfig {
        &self.shared.config
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate `contract` and everything it reaches
    ///
    /// # Errors
    ///
    /// `InvalidViewContract` with the first rejection found.
    pub fn validate(&self, contract: ContractRef) -> Result<()> {
        self.shared.validate(contract)
    }

    /// Whether `contract` is known valid
    pub fn is_valid(&self, contract: ContractRef) -> bool {
        contract.is_root() || self.shared.registry.is_valid(contract.id())
    }

    /// Recorded verdict for `contract`; `None` if never validated
    pub fn verdict(&self, contract: ContractRef) -> Option<bool> {
        if contract.is_root() {
            return Some(true);
        }
        self.shared
            .registry
            .verdict(contract.id())
            .map(|v| v == Verdict::Valid)
    }

    /// Number of contracts known valid, root excluded
    pub fn validated_count(&self) -> usize {
        self.shared.registry.validated_count()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// The cached view of `entity` as `contract`, created on first request
    ///
    /// # Errors
    ///
    /// `InvalidViewContract` if `contract` does not validate.
    pub fn get_or_create(&self, entity: &Entity, contract: ContractRef) -> Result<View> {
        self.shared.cached_view(entity, contract)
    }

    /// A fresh view that is not registered in the cache
    ///
    /// # Errors
    ///
    /// `InvalidViewContract` if `contract` does not validate.
    pub fn create_uncached(&self, entity: &Entity, contract: ContractRef) -> Result<View> {
        self.shared.fresh_view(entity, contract)
    }

    /// Typed adapter over the cached view of `entity` as `C`
    pub fn view<C: Contract>(&self, entity: &Entity) -> Result<C> {
        self.get_or_create(entity, C::contract())
            .map(C::from_view)
    }

    /// Typed adapter over a fresh, uncached view of `entity` as `C`
    pub fn uncached_view<C: Contract>(&self, entity: &Entity) -> Result<C> {
        self.create_uncached(entity, C::contract())
            .map(C::from_view)
    }

    /// Whether `candidate` is a view or a typed adapter of a contract this
    /// engine validated
    pub fn is_view(&self, candidate: &dyn Any) -> bool {
        candidate.is::<View>()
            || candidate.is::<Root>()
            || self
                .shared
                .registry
                .validated()
                .iter()
                .any(|contract| contract.is_instance(candidate))
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Discard every cached view
    pub fn clear_all(&self) -> usize {
        self.shared.cache.clear_all()
    }

    /// Discard the cached views of `contract` for every entity
    pub fn clear_contract(&self, contract: ContractRef) -> usize {
        self.shared.cache.clear_contract(contract.id())
    }

    /// Discard the cached views of `entity` for every contract
    pub fn clear_entity(&self, entity: &Entity) -> usize {
        self.shared.cache.clear_entity(entity.id())
    }

    /// Discard the cached view of `entity` as `contract`
    pub fn clear_one(&self, entity: &Entity, contract: ContractRef) -> bool {
        self.shared.cache.clear_one(entity.id(), contract.id())
    }

    /// Number of cached views
    pub fn cached_count(&self) -> usize {
        self.shared.cache.len()
    }
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewEngine {
    fn drop(&mut self) {
        // Cached views point back at the shared state.
        self.shared.cache.close();
    }
}
