//! Entity nodes
//!
//! An [`Entity`] is a cheap, clonable handle to a shared node holding:
//! - an identity
//! - an attribute container
//! - owned children keyed by identity
//! - a non-owning parent back-reference
//! - the set of contracts the entity has been marked as
//!
//! A parent owns its children: removing a child from its parent drops the
//! node once no other handle keeps it alive. [`WeakEntity`] is the
//! non-owning handle views keep.

use crate::attributes::AttributeContainer;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use facets_core::{AttributeKey, ContractId, EntityId, Error, Result, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

struct EntityNode {
    id: EntityId,
    parent: Weak<EntityNode>,
    attributes: AttributeContainer,
    children: DashMap<EntityId, Entity>,
    marks: RwLock<FxHashSet<ContractId>>,
}

/// Handle to an entity node
#[derive(Clone)]
pub struct Entity(Arc<EntityNode>);

/// Non-owning handle to an entity node
#[derive(Clone, Default)]
pub struct WeakEntity(Weak<EntityNode>);

impl Entity {
    /// Create a parentless entity with a random identity
    pub fn new() -> Self {
        Self::with_id(EntityId::new())
    }

    /// Create a parentless entity with the given identity
    pub fn with_id(id: EntityId) -> Self {
        Self::build(id, Weak::new(), &[])
    }

    fn build(id: EntityId, parent: Weak<EntityNode>, marks: &[ContractId]) -> Self {
        Entity(Arc::new(EntityNode {
            id,
            parent,
            attributes: AttributeContainer::new(),
            children: DashMap::new(),
            marks: RwLock::new(marks.iter().copied().collect()),
        }))
    }

    /// Identity of this entity
    pub fn id(&self) -> EntityId {
        self.0.id
    }

    /// Parent entity, if it has one and it is still alive
    pub fn parent(&self) -> Option<Entity> {
        self.0.parent.upgrade().map(Entity)
    }

    /// Identity of the parent entity
    pub fn parent_id(&self) -> Option<EntityId> {
        self.parent().map(|p| p.id())
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning handle to this entity
    pub fn downgrade(&self) -> WeakEntity {
        WeakEntity(Arc::downgrade(&self.0))
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Soft attribute get
    pub fn get_attribute(&self, key: &AttributeKey) -> Option<Value> {
        self.0.attributes.get(key)
    }

    /// Strict attribute get; fails with `AttributeAbsent`
    pub fn get_attribute_strict(&self, key: &AttributeKey) -> Result<Value> {
        self.0.attributes.get_strict(key)
    }

    /// Add or replace an attribute, returning the previous value
    pub fn add_attribute(&self, key: AttributeKey, value: Value) -> Result<Option<Value>> {
        self.0.attributes.add(key, value)
    }

    /// Soft attribute removal
    pub fn remove_attribute(&self, key: &AttributeKey) -> Option<Value> {
        self.0.attributes.remove(key)
    }

    /// Strict attribute removal; fails with `AttributeAbsent`
    pub fn remove_attribute_strict(&self, key: &AttributeKey) -> Result<Value> {
        self.0.attributes.remove_strict(key)
    }

    /// Number of attributes
    pub fn attribute_count(&self) -> usize {
        self.0.attributes.len()
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Create a child with a generated identity, marked as `marks`
    pub fn new_child(&self, marks: &[ContractId]) -> Entity {
        loop {
            let id = EntityId::new();
            if let Entry::Vacant(slot) = self.0.children.entry(id) {
                let child = Self::build(id, Arc::downgrade(&self.0), marks);
                slot.insert(child.clone());
                trace!(target: "facets::entity", parent = %self.0.id, child = %id, "Child created");
                return child;
            }
        }
    }

    /// Create a child with an explicit identity, marked as `marks`
    ///
    /// # Errors
    ///
    /// `EntityIdInUse` if this entity already has a child with that identity.
    pub fn new_child_with_id(&self, id: EntityId, marks: &[ContractId]) -> Result<Entity> {
        match self.0.children.entry(id) {
            Entry::Occupied(_) => Err(Error::EntityIdInUse(id)),
            Entry::Vacant(slot) => {
                let child = Self::build(id, Arc::downgrade(&self.0), marks);
                slot.insert(child.clone());
                trace!(target: "facets::entity", parent = %self.0.id, child = %id, "Child created");
                Ok(child)
            }
        }
    }

    /// Soft child lookup
    pub fn get_child(&self, id: EntityId) -> Option<Entity> {
        self.0.children.get(&id).map(|c| c.value().clone())
    }

    /// Strict child lookup; fails with `EntityAbsent`
    pub fn get_child_strict(&self, id: EntityId) -> Result<Entity> {
        self.get_child(id).ok_or(Error::EntityAbsent(id))
    }

    /// Whether a child with this identity exists
    pub fn has_child(&self, id: EntityId) -> bool {
        self.0.children.contains_key(&id)
    }

    /// Snapshot of all children
    pub fn children(&self) -> Vec<Entity> {
        self.0.children.iter().map(|c| c.value().clone()).collect()
    }

    /// Snapshot of the children marked as `contract`
    pub fn children_marked(&self, contract: ContractId) -> Vec<Entity> {
        self.0
            .children
            .iter()
            .filter(|c| c.value().is_marked_as(contract))
            .map(|c| c.value().clone())
            .collect()
    }

    /// Identities of all children
    pub fn child_ids(&self) -> Vec<EntityId> {
        self.0.children.iter().map(|c| *c.key()).collect()
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.0.children.len()
    }

    /// Detach a child; the node is dropped once no other handle holds it
    pub fn remove_child(&self, id: EntityId) -> Option<Entity> {
        let removed = self.0.children.remove(&id).map(|(_, child)| child);
        if removed.is_some() {
            trace!(target: "facets::entity", parent = %self.0.id, child = %id, "Child removed");
        }
        removed
    }

    // =========================================================================
    // Type marks
    // =========================================================================

    /// Mark this entity as a contract; false if it already was
    pub fn mark_as(&self, contract: ContractId) -> bool {
        self.0.marks.write().insert(contract)
    }

    /// Remove a mark; false if it was not present
    pub fn unmark_as(&self, contract: ContractId) -> bool {
        self.0.marks.write().remove(&contract)
    }

    /// Whether this entity is marked as `contract`
    pub fn is_marked_as(&self, contract: ContractId) -> bool {
        self.0.marks.read().contains(&contract)
    }

    /// All marks on this entity
    pub fn marks(&self) -> Vec<ContractId> {
        self.0.marks.read().iter().copied().collect()
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.0.id)
            .field("attributes", &self.0.attributes.len())
            .field("children", &self.0.children.len())
            .finish()
    }
}

impl WeakEntity {
    /// Upgrade to an owning handle if the node is still alive
    pub fn upgrade(&self) -> Option<Entity> {
        self.0.upgrade().map(Entity)
    }

    /// Whether the node is still alive
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether this handle refers to `entity`'s node
    pub fn points_to(&self, entity: &Entity) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&entity.0))
    }
}

impl fmt::Debug for WeakEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(e) => write!(f, "WeakEntity({})", e.id()),
            None => f.write_str("WeakEntity(<dropped>)"),
        }
    }
}
