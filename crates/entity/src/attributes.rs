//! Attribute container
//!
//! Holds the attributes of one entity, keyed by [`AttributeKey`]. Every write
//! is checked against the key's payload type so a container never holds a
//! value of the wrong type under a key.

use facets_core::{AttributeKey, Error, Result, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Thread-safe attribute map of one entity
#[derive(Debug, Default)]
pub struct AttributeContainer {
    entries: RwLock<FxHashMap<AttributeKey, Value>>,
}

impl AttributeContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft get: the value, or `None` if absent
    pub fn get(&self, key: &AttributeKey) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// Strict get: fails with `AttributeAbsent` if absent
    pub fn get_strict(&self, key: &AttributeKey) -> Result<Value> {
        self.get(key)
            .ok_or_else(|| Error::AttributeAbsent(key.clone()))
    }

    /// Insert or replace, returning the previous value
    ///
    /// # Errors
    ///
    /// `PayloadTypeMismatch` if `value` is not of the key's payload type.
    pub fn add(&self, key: AttributeKey, value: Value) -> Result<Option<Value>> {
        let actual = value.value_type();
        if actual != key.value_type() {
            return Err(Error::PayloadTypeMismatch { key, actual });
        }
        Ok(self.entries.write().insert(key, value))
    }

    /// Soft remove: the removed value, or `None` if absent
    pub fn remove(&self, key: &AttributeKey) -> Option<Value> {
        self.entries.write().remove(key)
    }

    /// Strict remove: fails with `AttributeAbsent` if absent
    pub fn remove_strict(&self, key: &AttributeKey) -> Result<Value> {
        self.remove(key)
            .ok_or_else(|| Error::AttributeAbsent(key.clone()))
    }

    /// Whether an attribute is present under `key`
    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
