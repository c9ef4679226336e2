//! Attribute payload model
//!
//! This module defines:
//! - Value: Unified enum for attribute payloads
//! - ValueType: The payload type half of an attribute key
//! - Payload: Bridge between Rust types and `Value`
//!
//! ## Type Rules
//!
//! - Different types are NEVER equal: `Int(1) != Float(1.0)`
//! - `Bytes` are not `String`
//! - There is no null variant; absence is always `Option::None`

use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute payload value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Entity identity
    Id(EntityId),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Payload type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Id(_) => ValueType::Id,
            Value::Array(_) => ValueType::Array,
        }
    }

    /// Convert into a Rust payload type, if the variant matches
    pub fn into_payload<T: Payload>(self) -> Option<T> {
        T::from_value(self)
    }
}

/// Payload type discriminant
///
/// Together with a name this forms an [`AttributeKey`](crate::AttributeKey):
/// two attributes with the same name but different payload types are
/// distinct attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// `String`
    String,
    /// `Vec<u8>`
    Bytes,
    /// `EntityId`
    Id,
    /// `Vec<Value>`
    Array,
}

impl ValueType {
    /// Short type name (for diagnostics)
    pub const fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
            ValueType::Id => "id",
            ValueType::Array => "array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust type that can be stored as an attribute payload
pub trait Payload: Sized {
    /// Payload type this Rust type maps to
    const TYPE: ValueType;

    /// Wrap into a `Value`
    fn into_value(self) -> Value;

    /// Unwrap from a `Value`; `None` if the variant does not match
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_payload {
    ($ty:ty, $variant:ident) => {
        impl Payload for $ty {
            const TYPE: ValueType = ValueType::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_payload!(bool, Bool);
impl_payload!(i64, Int);
impl_payload!(f64, Float);
impl_payload!(String, String);
impl_payload!(Vec<u8>, Bytes);
impl_payload!(EntityId, Id);
impl_payload!(Vec<Value>, Array);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
