//! Child creation, lookup and enumeration

use crate::common::{Container, Hall, Room};
use facets::{Contract, Entity, EntityId, Error, ViewEngine};

fn container() -> (ViewEngine, Entity, Container) {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let container: Container = engine.view(&entity).unwrap();
    (engine, entity, container)
}

#[test]
fn test_create_then_lookup() {
    let (_engine, entity, container) = container();
    let room = container.create().unwrap();
    let id = room.id().unwrap();

    assert!(entity.has_child(id));
    let found = container.lookup(id).unwrap().expect("room should be found");
    assert_eq!(found.id().unwrap(), id);
    assert!(container.lookup(EntityId::new()).unwrap().is_none());
}

#[test]
fn test_created_view_is_the_cached_one() {
    let (engine, entity, container) = container();
    let room = container.create().unwrap();
    let child = entity.get_child(room.id().unwrap()).unwrap();
    let cached: Room = engine.view(&child).unwrap();
    assert!(cached.as_view().ptr_eq(room.as_view()));
}

#[test]
fn test_create_with_explicit_id() {
    let (_engine, entity, container) = container();
    let id = EntityId::new();
    let room = container.create_with_id(id).unwrap();
    assert_eq!(room.id().unwrap(), id);
    assert_eq!(entity.get_child(id).unwrap().parent_id(), Some(entity.id()));

    let err = container.create_with_id(id).err().unwrap();
    assert_eq!(err, Error::EntityIdInUse(id));
    assert_eq!(entity.child_count(), 1);
}

#[test]
fn test_strict_lookup_of_missing_child() {
    let (_engine, _entity, container) = container();
    let missing = EntityId::new();
    let err = container.lookup_strict(missing).err().unwrap();
    assert_eq!(err, Error::EntityAbsent(missing));
}

#[test]
fn test_created_children_carry_lineage_marks() {
    let (_engine, entity, container) = container();
    let hall = container.create_hall().unwrap();
    let child = entity.get_child(hall.as_view().id().unwrap()).unwrap();
    assert!(child.is_marked_as(Hall::contract().id()));
    assert!(child.is_marked_as(Room::contract().id()));
    assert!(!child.is_marked_as(Container::contract().id()));
}

#[test]
fn test_of_type_versus_as_type_sets() {
    let (_engine, entity, container) = container();
    container.create().unwrap();
    container.create_hall().unwrap();
    entity.new_child(&[]);

    assert_eq!(container.rooms().unwrap().len(), 2);
    assert_eq!(container.all_as_rooms().unwrap().len(), 3);
}

#[test]
fn test_of_type_versus_as_type_streams() {
    let (_engine, entity, container) = container();
    container.create().unwrap();
    container.create_hall().unwrap();
    entity.new_child(&[]);

    assert_eq!(container.stream_halls().unwrap().count(), 1);
    assert_eq!(container.stream_all_as_halls().unwrap().count(), 3);
}

#[test]
fn test_lookup_reinterprets_any_child() {
    let (_engine, entity, container) = container();
    let plain = entity.new_child(&[]);
    let room = container.lookup(plain.id()).unwrap().unwrap();
    room.set_name(Some("attic")).unwrap();
    assert_eq!(room.describe().unwrap(), "room attic");
}

#[test]
fn test_root_pass_through_on_parent() {
    let (_engine, _entity, container) = container();
    let view = container.as_view();
    container.create().unwrap();
    container.create().unwrap();

    assert_eq!(view.invoke("child_count", &[]).unwrap().into_count().unwrap(), 2);
    assert_eq!(view.invoke("child_ids", &[]).unwrap().into_ids().unwrap().len(), 2);
}
