//! Provided bodies composed from sibling methods

use crate::common::{Container, Hall, Room};
use facets::{Contract, Entity, Error, ViewEngine};

#[test]
fn test_provided_body_reads_through_the_view() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let room: Room = engine.view(&entity).unwrap();

    assert_eq!(room.describe().unwrap(), "unnamed room");
    room.set_name(Some("kitchen")).unwrap();
    assert_eq!(room.describe().unwrap(), "room kitchen");
}

#[test]
fn test_subcontract_inherits_provided_body() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let container: Container = engine.view(&entity).unwrap();
    let hall = container.create_hall().unwrap();

    let view = hall.as_view();
    view.invoke("set_name", &[facets::Arg::value("gallery")]).unwrap();
    let text: String = view.invoke("describe", &[]).unwrap().into_value().unwrap();
    assert_eq!(text, "room gallery");
    assert!(view.invoke("length", &[]).unwrap().is_absent());
}

#[test]
fn test_provided_body_on_stale_view() {
    let engine = ViewEngine::new();
    let room: Room = {
        let entity = Entity::new();
        engine.uncached_view(&entity).unwrap()
    };
    assert!(matches!(room.describe(), Err(Error::StaleView { contract: "Room" })));
}

#[test]
fn test_adapters_are_views() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let hall: Hall = engine.view(&entity).unwrap();
    assert!(engine.is_view(&hall));
    assert!(engine.is_view(hall.as_view()));
    assert!(!engine.is_view(&"not a view"));
}
