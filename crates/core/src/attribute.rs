//! Attribute keys
//!
//! An attribute is addressed by its name *and* its payload type, so
//! `("scary", bool)` and `("scary", string)` name different attributes.

use crate::value::{Payload, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Key of one attribute in an entity's attribute container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey {
    name: Arc<str>,
    value_type: ValueType,
}

impl AttributeKey {
    /// Create a key from a name and payload type
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    /// Create a key whose payload type is the Rust type `T`
    pub fn of<T: Payload>(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, T::TYPE)
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value_type)
    }
}
