//! Facets - typed capability views over generic entities
//!
//! An entity is a bag of typed attributes plus a set of child entities.
//! Facets lets callers declare a *contract* (a named set of methods) and
//! look at any entity through it. Each contract method is routed by a
//! marker to one primitive entity operation, or delegated to the entity, or
//! implemented by a plain Rust function that receives the view.
//!
//! # Quick Start
//!
//! ```
//! use facets::{Arg, Contract, ContractSchema, Entity, Marker, MethodSchema, Result, TypeRef, View, ViewEngine};
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
//!                     .param(TypeRef::optional(TypeRef::payload::<bool>()))
//!                     .returns(TypeRef::optional(TypeRef::payload::<bool>()))
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
//!
//! impl Ghost {
//!     fn is_scary(&self) -> Result<Option<bool>> {
//!         self.0.invoke("is_scary", &[])?.into_optional()
//!     }
//!
//!     fn set_scary(&self, scary: Option<bool>) -> Result<Option<bool>> {
//!         self.0.invoke("set_scary", &[Arg::from(scary)])?.into_optional()
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let engine = ViewEngine::new();
//! let entity = Entity::new();
//! let ghost: Ghost = engine.view(&entity)?;
//!
//! assert_eq!(ghost.is_scary()?, None);
//! ghost.set_scary(Some(true))?;
//! assert_eq!(ghost.is_scary()?, Some(true));
//! ghost.set_scary(None)?;
//! assert_eq!(ghost.is_scary()?, None);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `facets-core`: identities, payload values, attribute keys, errors
//! - `facets-entity`: the in-memory entity graph views operate on
//! - `facets-view`: contract schemas, validation, dispatch, view cache

pub use facets_core::{
    AttributeKey, ContractId, EntityId, Error, Payload, Result, Value, ValueType,
};
pub use facets_entity::{AttributeContainer, Entity, WeakEntity};
pub use facets_view::*;
