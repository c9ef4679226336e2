//! Type descriptor resolution
//!
//! Turns one marked contract method into a [`MethodDescriptor`]: which
//! primitive operation family it routes to, the resolved target (attribute
//! key or referenced contract), and its strict/soft and membership modes.
//!
//! Shape rules per marker:
//!
//! | Marker | Params | Return | Target |
//! |--------|--------|--------|--------|
//! | GetAttribute | none | `T` (strict) or `Optional<T>` (soft) | payload `T`, never primitive |
//! | SetAttribute | one payload `T` | `()`/`T` (strict) or `Optional<T>` (soft) | payload `T` |
//! | NewEntity | none or one id | contract `C` | `C`, never root |
//! | GetEntity | one id | `C` (strict) or `Optional<C>` (soft) | `C`, never root |
//! | StreamEntities | none | `Stream<C>` | `C`, never root |
//! | GetEntities | none | `Set<C>` | `C`, never root |
//!
//! A rejection is reported as a reason string; the validator turns it into
//! an `InvalidViewContract` for the contract being validated.

use crate::schema::{ContractRef, Marker, MethodSchema, TypeRef};
use facets_core::{AttributeKey, ValueType};

/// Primitive operation family a marked method routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFamily {
    /// Attribute read
    AttributeGet,
    /// Attribute add/remove
    AttributeSet,
    /// Child creation
    EntityCreate,
    /// Child lookup
    EntityGet,
    /// Lazy child enumeration
    EntityStream,
    /// Child set
    EntitySet,
}

/// Absence handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Absence is an error
    Strict,
    /// Absence is reported as `Reply::Absent`
    Soft,
}

/// Which children an enumeration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Only children marked exactly as the element contract
    ExactType,
    /// Every child, reinterpreted as the element contract
    Projectable,
}

/// What a descriptor routes to
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// An attribute of the entity
    Attribute(AttributeKey),
    /// Children viewed as a contract
    Contract(ContractRef),
}

/// Routing information for one marked method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Operation family
    pub family: MarkerFamily,
    /// Resolved target
    pub target: Target,
    /// Strict or soft absence handling
    pub mode: Mode,
    /// Enumeration membership (only meaningful for stream/set)
    pub membership: Membership,
    /// Number of arguments a call must supply
    pub arity: usize,
    /// Whether the method declares no return value
    pub returns_unit: bool,
}

impl MethodDescriptor {
    fn new(family: MarkerFamily, target: Target, arity: usize) -> Self {
        Self {
            family,
            target,
            mode: Mode::Strict,
            membership: Membership::Projectable,
            arity,
            returns_unit: false,
        }
    }

    /// Attribute key, for attribute families
    pub fn attribute(&self) -> Option<&AttributeKey> {
        match &self.target {
            Target::Attribute(key) => Some(key),
            Target::Contract(_) => None,
        }
    }

    /// Referenced contract, for entity families
    pub fn contract(&self) -> Option<ContractRef> {
        match &self.target {
            Target::Contract(c) => Some(*c),
            Target::Attribute(_) => None,
        }
    }

    /// Whether absence is reported instead of failing
    pub fn is_soft(&self) -> bool {
        self.mode == Mode::Soft
    }
}

type Resolution = std::result::Result<MethodDescriptor, String>;

/// Resolve the descriptor of `method` routed by `marker`
pub fn resolve(method: &MethodSchema, marker: &Marker) -> Resolution {
    match *marker {
        Marker::GetAttribute(name) => resolve_get_attribute(method, name),
        Marker::SetAttribute(name) => resolve_set_attribute(method, name),
        Marker::NewEntity => resolve_new_entity(method),
        Marker::GetEntity => resolve_get_entity(method),
        Marker::StreamEntities { of_type } => {
            let contract = element_contract(method, "Stream", |ty| match ty {
                TypeRef::Stream(inner) => Some(&**inner),
                _ => None,
            })?;
            let mut desc =
                MethodDescriptor::new(MarkerFamily::EntityStream, Target::Contract(contract), 0);
            desc.membership = membership(of_type);
            Ok(desc)
        }
        Marker::GetEntities { of_type } => {
            let contract = element_contract(method, "Set", |ty| match ty {
                TypeRef::Set(inner) => Some(&**inner),
                _ => None,
            })?;
            let mut desc =
                MethodDescriptor::new(MarkerFamily::EntitySet, Target::Contract(contract), 0);
            desc.membership = membership(of_type);
            Ok(desc)
        }
    }
}

fn membership(of_type: bool) -> Membership {
    if of_type {
        Membership::ExactType
    } else {
        Membership::Projectable
    }
}

/// Strip one `Optional` layer, reporting whether there was one
fn unwrap_optional(ty: &TypeRef) -> (&TypeRef, bool) {
    match ty {
        TypeRef::Optional(inner) => (&**inner, true),
        other => (other, false),
    }
}

fn attribute_payload(ty: &TypeRef) -> std::result::Result<ValueType, String> {
    match ty {
        TypeRef::Payload(t) => Ok(*t),
        TypeRef::Primitive(t) => Err(format!("attribute type primitive {} cannot be absent", t)),
        other => Err(format!("{} is not an attribute payload type", other)),
    }
}

fn entity_contract(ty: &TypeRef) -> std::result::Result<ContractRef, String> {
    match ty {
        TypeRef::Contract(c) if c.is_root() => {
            Err("the root contract cannot be a target".to_string())
        }
        TypeRef::Contract(c) => Ok(*c),
        other => Err(format!("{} is not a contract", other)),
    }
}

fn resolve_get_attribute(method: &MethodSchema, name: &'static str) -> Resolution {
    if name.is_empty() {
        return Err("attribute name is empty".to_string());
    }
    if !method.params.is_empty() {
        return Err(format!("expected no parameters, found {}", method.params.len()));
    }
    if method.returns.is_unit() {
        return Err("attribute getter must return a value".to_string());
    }

    let (resolved, optional) = unwrap_optional(&method.returns);
    let payload = attribute_payload(resolved)?;

    let mut desc = MethodDescriptor::new(
        MarkerFamily::AttributeGet,
        Target::Attribute(AttributeKey::new(name, payload)),
        0,
    );
    if optional {
        desc.mode = Mode::Soft;
    }
    Ok(desc)
}

fn resolve_set_attribute(method: &MethodSchema, name: &'static str) -> Resolution {
    if name.is_empty() {
        return Err("attribute name is empty".to_string());
    }
    if method.params.len() != 1 {
        return Err(format!(
            "expected exactly one parameter, found {}",
            method.params.len()
        ));
    }

    // A setter parameter may be written either as T or Optional<T>.
    let (param, _) = unwrap_optional(&method.params[0]);
    let payload = attribute_payload(param)?;

    let mut desc = MethodDescriptor::new(
        MarkerFamily::AttributeSet,
        Target::Attribute(AttributeKey::new(name, payload)),
        1,
    );

    if method.returns.is_unit() {
        desc.returns_unit = true;
        return Ok(desc);
    }

    let (returned, optional) = unwrap_optional(&method.returns);
    if *returned != TypeRef::Payload(payload) {
        return Err(format!(
            "setter returns {} but takes {}",
            method.returns, method.params[0]
        ));
    }
    if optional {
        desc.mode = Mode::Soft;
    }
    Ok(desc)
}

fn resolve_new_entity(method: &MethodSchema) -> Resolution {
    if method.returns.is_unit() {
        return Err("entity constructor must return a contract".to_string());
    }
    let arity = match method.params.as_slice() {
        [] => 0,
        [TypeRef::Id] => 1,
        _ => return Err("entity constructor takes no parameters or one id".to_string()),
    };
    let contract = entity_contract(&method.returns)?;
    Ok(MethodDescriptor::new(
        MarkerFamily::EntityCreate,
        Target::Contract(contract),
        arity,
    ))
}

fn resolve_get_entity(method: &MethodSchema) -> Resolution {
    if method.returns.is_unit() {
        return Err("entity getter must return a contract".to_string());
    }
    if method.params.as_slice() != [TypeRef::Id] {
        return Err("entity getter takes exactly one id".to_string());
    }

    let (resolved, optional) = unwrap_optional(&method.returns);
    let contract = entity_contract(resolved)?;

    let mut desc =
        MethodDescriptor::new(MarkerFamily::EntityGet, Target::Contract(contract), 1);
    if optional {
        desc.mode = Mode::Soft;
    }
    Ok(desc)
}

fn element_contract(
    method: &MethodSchema,
    container: &str,
    element: impl Fn(&TypeRef) -> Option<&TypeRef>,
) -> std::result::Result<ContractRef, String> {
    if !method.params.is_empty() {
        return Err(format!("expected no parameters, found {}", method.params.len()));
    }
    let inner = element(&method.returns)
        .ok_or_else(|| format!("expected {}<contract>, found {}", container, method.returns))?;
    entity_contract(inner)
}
