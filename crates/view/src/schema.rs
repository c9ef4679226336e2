//! Contract declarations
//!
//! A contract is described by an explicit [`ContractSchema`] rather than
//! discovered by reflection. Each method of a schema is exactly one of:
//!
//! | Kind | Declared as | Routed to |
//! |------|-------------|-----------|
//! | pass-through | a method of the root contract | the entity itself |
//! | provided-body | `MethodBody::Provided` | the Rust `fn`, with the view as receiver |
//! | marked | `MethodBody::Abstract` + one [`Marker`] | a primitive entity operation |
//!
//! Contracts reference each other through [`ContractRef`], which carries a
//! schema *builder* instead of a schema, so mutually referential contracts
//! never have to be constructed eagerly.
//!
//! ## Example
//!
//! ```
//! use facets_view::{Contract, ContractSchema, Marker, MethodSchema, TypeRef, View};
//!
//! struct Ghost(View);
//!
//! impl Contract for Ghost {
//!     const NAME: &'static str = "Ghost";
//!
//!     fn schema() -> ContractSchema {
//!         ContractSchema::entity(Self::NAME)
//!             .method(
//!                 MethodSchema::new("is_scary")
//!                     .returns(TypeRef::optional(TypeRef::payload::<bool>()))
//!                     .marked(Marker::GetAttribute("scary")),
//!             )
//!             .method(
//!                 MethodSchema::new("set_scary")
//!                     .param(TypeRef::payload::<bool>())
//!                     .marked(Marker::SetAttribute("scary")),
//!             )
//!     }
//!
//!     fn from_view(view: View) -> Self {
//!         Ghost(view)
//!     }
//!
//!     fn as_view(&self) -> &View {
//!         &self.0
//!     }
//! }
//! ```

use crate::dispatch::{Arg, Reply, View};
use facets_core::{ContractId, Error, Payload, Result, ValueType};
use facets_entity::Entity;
use std::any::Any;
use std::fmt;

/// Body of a provided method; the receiver is the view it was invoked on
pub type ProvidedFn = fn(&View, &[Arg]) -> Result<Reply>;

/// Body of a static method; never reachable through a view
pub type StaticFn = fn(&[Arg]) -> Result<Reply>;

// =============================================================================
// Types
// =============================================================================

/// Declared parameter or return type of a contract method
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// No value
    Unit,
    /// A bare value slot that cannot express absence
    Primitive(ValueType),
    /// An attribute payload
    Payload(ValueType),
    /// An entity identity
    Id,
    /// Another contract
    Contract(ContractRef),
    /// Optional wrapper
    Optional(Box<TypeRef>),
    /// Unordered unique container
    Set(Box<TypeRef>),
    /// Lazy sequence
    Stream(Box<TypeRef>),
}

impl TypeRef {
    /// Payload type of the Rust type `T`
    pub fn payload<T: Payload>() -> Self {
        TypeRef::Payload(T::TYPE)
    }

    /// Bare primitive slot of the Rust type `T`
    pub fn primitive<T: Payload>() -> Self {
        TypeRef::Primitive(T::TYPE)
    }

    /// Contract `C`
    pub fn contract<C: Contract>() -> Self {
        TypeRef::Contract(ContractRef::of::<C>())
    }

    /// `Optional<inner>`
    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    /// `Set<inner>`
    pub fn set_of(inner: TypeRef) -> Self {
        TypeRef::Set(Box::new(inner))
    }

    /// `Stream<inner>`
    pub fn stream_of(inner: TypeRef) -> Self {
        TypeRef::Stream(Box::new(inner))
    }

    /// Whether this is `Unit`
    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Unit)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unit => f.write_str("()"),
            TypeRef::Primitive(t) => write!(f, "primitive {}", t),
            TypeRef::Payload(t) => write!(f, "{}", t),
            TypeRef::Id => f.write_str("id"),
            TypeRef::Contract(c) => f.write_str(c.name()),
            TypeRef::Optional(inner) => write!(f, "Optional<{}>", inner),
            TypeRef::Set(inner) => write!(f, "Set<{}>", inner),
            TypeRef::Stream(inner) => write!(f, "Stream<{}>", inner),
        }
    }
}

// =============================================================================
// Markers and methods
// =============================================================================

/// Routing marker attached to an unimplemented contract method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Read the named attribute
    GetAttribute(&'static str),
    /// Write (or, with a null argument, remove) the named attribute
    SetAttribute(&'static str),
    /// Create a child entity
    NewEntity,
    /// Look up a child entity by identity
    GetEntity,
    /// Lazily enumerate children
    StreamEntities {
        /// Only children marked exactly as the element contract
        of_type: bool,
    },
    /// Collect children into a set
    GetEntities {
        /// Only children marked exactly as the element contract
        of_type: bool,
    },
}

/// Implementation of a contract method
#[derive(Clone, Copy)]
pub enum MethodBody {
    /// No implementation; must be routed by a marker
    Abstract,
    /// Provided body, invoked with the view as receiver
    Provided(ProvidedFn),
    /// Static helper, not part of the view surface
    Static(StaticFn),
}

impl MethodBody {
    /// Whether the method has its own implementation
    pub fn has_body(&self) -> bool {
        !matches!(self, MethodBody::Abstract)
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Abstract => f.write_str("Abstract"),
            MethodBody::Provided(_) => f.write_str("Provided"),
            MethodBody::Static(_) => f.write_str("Static"),
        }
    }
}

/// One declared contract method
#[derive(Debug, Clone)]
pub struct MethodSchema {
    /// Method name
    pub name: &'static str,
    /// Parameter types, in order
    pub params: Vec<TypeRef>,
    /// Return type
    pub returns: TypeRef,
    /// Implementation kind
    pub body: MethodBody,
    /// Routing markers (a valid marked method has exactly one)
    pub markers: Vec<Marker>,
}

impl MethodSchema {
    /// Abstract, unmarked method with no parameters returning `Unit`
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            params: Vec::new(),
            returns: TypeRef::Unit,
            body: MethodBody::Abstract,
            markers: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = ty;
        self
    }

    /// Attach a marker
    pub fn marked(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Give the method a provided body
    pub fn provided(mut self, body: ProvidedFn) -> Self {
        self.body = MethodBody::Provided(body);
        self
    }

    /// Make the method a static helper
    pub fn static_fn(mut self, body: StaticFn) -> Self {
        self.body = MethodBody::Static(body);
        self
    }
}

// =============================================================================
// Contracts
// =============================================================================

/// Declaration of one contract
#[derive(Debug, Clone)]
pub struct ContractSchema {
    /// Contract name
    pub name: &'static str,
    /// Direct super-contracts
    pub extends: Vec<ContractRef>,
    /// Methods declared directly on this contract
    pub methods: Vec<MethodSchema>,
}

impl ContractSchema {
    /// Contract with no super-contracts
    ///
    /// Such a contract is outside the entity family and never validates;
    /// use [`ContractSchema::entity`] for entity contracts.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            extends: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Contract extending the universal root
    pub fn entity(name: &'static str) -> Self {
        Self::new(name).extends(ContractRef::root())
    }

    /// Add a super-contract
    pub fn extends(mut self, parent: ContractRef) -> Self {
        self.extends.push(parent);
        self
    }

    /// Declare a method
    pub fn method(mut self, method: MethodSchema) -> Self {
        self.methods.push(method);
        self
    }

    /// Method declared directly on this contract
    pub fn find_method(&self, name: &str) -> Option<&MethodSchema> {
        self.methods.iter().find(|m| m.name == name)
    }
}

fn matches_type<C: 'static>(candidate: &dyn Any) -> bool {
    candidate.is::<C>()
}

/// Handle to a declared contract
///
/// Equality and hashing follow the contract identity only.
#[derive(Clone, Copy)]
pub struct ContractRef {
    id: ContractId,
    schema: fn() -> ContractSchema,
    matches_type: fn(&dyn Any) -> bool,
}

impl ContractRef {
    /// Handle to contract `C`
    pub fn of<C: Contract>() -> Self {
        Self {
            id: ContractId::of::<C>(C::NAME),
            schema: C::schema,
            matches_type: matches_type::<C>,
        }
    }

    /// Handle to the universal root contract
    pub fn root() -> Self {
        Self::of::<Root>()
    }

    /// Contract identity
    pub fn id(&self) -> ContractId {
        self.id
    }

    /// Contract name
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Build this contract's schema
    pub fn schema(&self) -> ContractSchema {
        (self.schema)()
    }

    /// Whether this is the universal root
    pub fn is_root(&self) -> bool {
        self.id == ContractId::of::<Root>(Root::NAME)
    }

    /// Whether `candidate` is a typed adapter of this contract
    pub fn is_instance(&self, candidate: &dyn Any) -> bool {
        (self.matches_type)(candidate)
    }
}

impl PartialEq for ContractRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContractRef {}

impl std::hash::Hash for ContractRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractRef({})", self.name())
    }
}

/// A Rust type standing for a contract, with a typed adapter over [`View`]
pub trait Contract: Any + Send + Sync + Sized {
    /// Contract name
    const NAME: &'static str;

    /// Declaration of the contract
    fn schema() -> ContractSchema;

    /// Wrap a view bound to this contract
    fn from_view(view: View) -> Self;

    /// The underlying view
    fn as_view(&self) -> &View;

    /// Handle to this contract
    fn contract() -> ContractRef {
        ContractRef::of::<Self>()
    }
}

// =============================================================================
// Universal root
// =============================================================================

/// Methods every view inherits from the root, delegated to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThrough {
    /// Entity identity
    Id,
    /// Parent identity, if any
    ParentId,
    /// Number of children
    ChildCount,
    /// Number of attributes
    AttributeCount,
    /// Identities of all children
    ChildIds,
}

impl PassThrough {
    /// All pass-through operations
    pub const ALL: [PassThrough; 5] = [
        PassThrough::Id,
        PassThrough::ParentId,
        PassThrough::ChildCount,
        PassThrough::AttributeCount,
        PassThrough::ChildIds,
    ];

    /// Method name on the root contract
    pub const fn name(&self) -> &'static str {
        match self {
            PassThrough::Id => "id",
            PassThrough::ParentId => "parent_id",
            PassThrough::ChildCount => "child_count",
            PassThrough::AttributeCount => "attribute_count",
            PassThrough::ChildIds => "child_ids",
        }
    }

    /// Parse from a root method name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    fn returns(&self) -> TypeRef {
        match self {
            PassThrough::Id => TypeRef::Id,
            PassThrough::ParentId => TypeRef::optional(TypeRef::Id),
            PassThrough::ChildCount | PassThrough::AttributeCount => {
                TypeRef::primitive::<i64>()
            }
            PassThrough::ChildIds => TypeRef::set_of(TypeRef::Id),
        }
    }

    /// Run the operation against the entity
    pub(crate) fn apply(&self, entity: &Entity, args: &[Arg]) -> Result<Reply> {
        if !args.is_empty() {
            return Err(Error::argument_mismatch(
                self.name(),
                format!("expected no arguments, got {}", args.len()),
            ));
        }
        Ok(match self {
            PassThrough::Id => Reply::Id(entity.id()),
            PassThrough::ParentId => entity.parent_id().map_or(Reply::Absent, Reply::Id),
            PassThrough::ChildCount => Reply::Count(entity.child_count()),
            PassThrough::AttributeCount => Reply::Count(entity.attribute_count()),
            PassThrough::ChildIds => Reply::Ids(entity.child_ids()),
        })
    }
}

/// The universal root contract
///
/// Every entity contract extends it, directly or through its
/// super-contracts. Its methods are pass-through operations.
pub struct Root(View);

impl Contract for Root {
    const NAME: &'static str = "Entity";

    fn schema() -> ContractSchema {
        PassThrough::ALL
            .iter()
            .fold(ContractSchema::new(Self::NAME), |schema, op| {
                schema.method(MethodSchema::new(op.name()).returns(op.returns()))
            })
    }

    fn from_view(view: View) -> Self {
        Root(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}
