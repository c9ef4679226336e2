//! Shared contracts for the end-to-end view tests.

#![allow(dead_code)]

use facets::{
    Arg, Contract, ContractSchema, EntityId, Marker, MethodSchema, Reply, Result, TypeRef, Value,
    View,
};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Ghost
// ============================================================================

/// Soft `scary` flag plus a strict `health` counter
pub struct Ghost(View);

impl Contract for Ghost {
    const NAME: &'static str = "Ghost";

    fn schema() -> ContractSchema {
        ContractSchema::entity(Self::NAME)
            .method(
                MethodSchema::new("is_scary")
                    .returns(TypeRef::optional(TypeRef::payload::<bool>()))
                    .marked(Marker::GetAttribute("scary")),
            )
            .method(
                MethodSchema::new("set_scary")
                    .param(TypeRef::optional(TypeRef::payload::<bool>()))
                    .returns(TypeRef::optional(TypeRef::payload::<bool>()))
                    .marked(Marker::SetAttribute("scary")),
            )
            .method(
                MethodSchema::new("health")
                    .returns(TypeRef::payload::<i64>())
                    .marked(Marker::GetAttribute("health")),
            )
            .method(
                MethodSchema::new("set_health")
                    .param(TypeRef::payload::<i64>())
                    .marked(Marker::SetAttribute("health")),
            )
    }

    fn from_view(view: View) -> Self {
        Ghost(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}

impl Ghost {
    pub fn is_scary(&self) -> Result<Option<bool>> {
        self.0.invoke("is_scary", &[])?.into_optional()
    }

    pub fn set_scary(&self, scary: Option<bool>) -> Result<Option<bool>> {
        self.0.invoke("set_scary", &[Arg::from(scary)])?.into_optional()
    }

    pub fn health(&self) -> Result<i64> {
        self.0.invoke("health", &[])?.into_value()
    }

    pub fn set_health(&self, health: Option<i64>) -> Result<()> {
        self.0.invoke("set_health", &[Arg::from(health)])?.into_unit()
    }
}

// ============================================================================
// Room / Hall
// ============================================================================

fn describe(view: &View, _: &[Arg]) -> Result<Reply> {
    let name = view.invoke("name", &[])?.into_optional::<String>()?;
    let text = match name {
        Some(name) => format!("room {}", name),
        None => "unnamed room".to_string(),
    };
    Ok(Reply::Value(Value::String(text)))
}

/// A named room with a provided `describe` body
pub struct Room(View);

impl Contract for Room {
    const NAME: &'static str = "Room";

    fn schema() -> ContractSchema {
        ContractSchema::entity(Self::NAME)
            .method(
                MethodSchema::new("name")
                    .returns(TypeRef::optional(TypeRef::payload::<String>()))
                    .marked(Marker::GetAttribute("name")),
            )
            .method(
                MethodSchema::new("set_name")
                    .param(TypeRef::optional(TypeRef::payload::<String>()))
                    .returns(TypeRef::optional(TypeRef::payload::<String>()))
                    .marked(Marker::SetAttribute("name")),
            )
            .method(
                MethodSchema::new("describe")
                    .returns(TypeRef::payload::<String>())
                    .provided(describe),
            )
    }

    fn from_view(view: View) -> Self {
        Room(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}

impl Room {
    pub fn id(&self) -> Result<EntityId> {
        self.0.id()
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.0.invoke("name", &[])?.into_optional()
    }

    pub fn set_name(&self, name: Option<&str>) -> Result<Option<String>> {
        let arg = name.map_or(Arg::Null, |n| Arg::value(n));
        self.0.invoke("set_name", &[arg])?.into_optional()
    }

    pub fn describe(&self) -> Result<String> {
        self.0.invoke("describe", &[])?.into_value()
    }
}

/// A room subtype, to exercise lineage marks
pub struct Hall(View);

impl Contract for Hall {
    const NAME: &'static str = "Hall";

    fn schema() -> ContractSchema {
        ContractSchema::new(Self::NAME)
            .extends(Room::contract())
            .method(
                MethodSchema::new("length")
                    .returns(TypeRef::optional(TypeRef::payload::<i64>()))
                    .marked(Marker::GetAttribute("length")),
            )
    }

    fn from_view(view: View) -> Self {
        Hall(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}

// ============================================================================
// Container
// ============================================================================

/// Creates, looks up and enumerates rooms
pub struct Container(View);

impl Contract for Container {
    const NAME: &'static str = "Container";

    fn schema() -> ContractSchema {
        ContractSchema::entity(Self::NAME)
            .method(
                MethodSchema::new("create")
                    .returns(TypeRef::contract::<Room>())
                    .marked(Marker::NewEntity),
            )
            .method(
                MethodSchema::new("create_with_id")
                    .param(TypeRef::Id)
                    .returns(TypeRef::contract::<Room>())
                    .marked(Marker::NewEntity),
            )
            .method(
                MethodSchema::new("create_hall")
                    .returns(TypeRef::contract::<Hall>())
                    .marked(Marker::NewEntity),
            )
            .method(
                MethodSchema::new("lookup")
                    .param(TypeRef::Id)
                    .returns(TypeRef::optional(TypeRef::contract::<Room>()))
                    .marked(Marker::GetEntity),
            )
            .method(
                MethodSchema::new("lookup_strict")
                    .param(TypeRef::Id)
                    .returns(TypeRef::contract::<Room>())
                    .marked(Marker::GetEntity),
            )
            .method(
                MethodSchema::new("rooms")
                    .returns(TypeRef::set_of(TypeRef::contract::<Room>()))
                    .marked(Marker::GetEntities { of_type: true }),
            )
            .method(
                MethodSchema::new("all_as_rooms")
                    .returns(TypeRef::set_of(TypeRef::contract::<Room>()))
                    .marked(Marker::GetEntities { of_type: false }),
            )
            .method(
                MethodSchema::new("stream_halls")
                    .returns(TypeRef::stream_of(TypeRef::contract::<Hall>()))
                    .marked(Marker::StreamEntities { of_type: true }),
            )
            .method(
                MethodSchema::new("stream_all_as_halls")
                    .returns(TypeRef::stream_of(TypeRef::contract::<Hall>()))
                    .marked(Marker::StreamEntities { of_type: false }),
            )
    }

    fn from_view(view: View) -> Self {
        Container(view)
    }

    fn as_view(&self) -> &View {
        &self.0
    }
}

impl Container {
    pub fn create(&self) -> Result<Room> {
        self.0.invoke("create", &[])?.into_contract()
    }

    pub fn create_with_id(&self, id: EntityId) -> Result<Room> {
        self.0.invoke("create_with_id", &[Arg::from(id)])?.into_contract()
    }

    pub fn create_hall(&self) -> Result<Hall> {
        self.0.invoke("create_hall", &[])?.into_contract()
    }

    pub fn lookup(&self, id: EntityId) -> Result<Option<Room>> {
        self.0.invoke("lookup", &[Arg::from(id)])?.into_optional_contract()
    }

    pub fn lookup_strict(&self, id: EntityId) -> Result<Room> {
        self.0.invoke("lookup_strict", &[Arg::from(id)])?.into_contract()
    }

    pub fn rooms(&self) -> Result<Vec<Room>> {
        self.0.invoke("rooms", &[])?.into_set()
    }

    pub fn all_as_rooms(&self) -> Result<Vec<Room>> {
        self.0.invoke("all_as_rooms", &[])?.into_set()
    }

    pub fn stream_halls(&self) -> Result<impl Iterator<Item = Hall>> {
        self.0.invoke("stream_halls", &[])?.into_stream()
    }

    pub fn stream_all_as_halls(&self) -> Result<impl Iterator<Item = Hall>> {
        self.0.invoke("stream_all_as_halls", &[])?.into_stream()
    }
}
