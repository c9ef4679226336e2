//! Cache identity and invalidation scoping

use crate::common::{Ghost, Room};
use facets::{Contract, Entity, ViewEngine};

#[test]
fn test_get_or_create_twice_is_identical() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let a = engine.get_or_create(&entity, Ghost::contract()).unwrap();
    let b = engine.get_or_create(&entity, Ghost::contract()).unwrap();
    assert!(a.ptr_eq(&b));
}

#[test]
fn test_clear_contract_is_scoped() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost = engine.get_or_create(&entity, Ghost::contract()).unwrap();
    let room = engine.get_or_create(&entity, Room::contract()).unwrap();

    assert_eq!(engine.clear_contract(Ghost::contract()), 1);

    let ghost_again = engine.get_or_create(&entity, Ghost::contract()).unwrap();
    let room_again = engine.get_or_create(&entity, Room::contract()).unwrap();
    assert!(!ghost_again.ptr_eq(&ghost));
    assert!(room_again.ptr_eq(&room));
}

#[test]
fn test_clear_entity_is_scoped() {
    let engine = ViewEngine::new();
    let first = Entity::new();
    let second = Entity::new();
    let a = engine.get_or_create(&first, Ghost::contract()).unwrap();
    let b = engine.get_or_create(&second, Ghost::contract()).unwrap();

    assert_eq!(engine.clear_entity(&first), 1);
    assert!(!engine.get_or_create(&first, Ghost::contract()).unwrap().ptr_eq(&a));
    assert!(engine.get_or_create(&second, Ghost::contract()).unwrap().ptr_eq(&b));
}

#[test]
fn test_clear_one_and_clear_all() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    engine.get_or_create(&entity, Ghost::contract()).unwrap();
    engine.get_or_create(&entity, Room::contract()).unwrap();

    assert!(engine.clear_one(&entity, Ghost::contract()));
    assert_eq!(engine.cached_count(), 1);
    assert_eq!(engine.clear_all(), 1);
    assert_eq!(engine.cached_count(), 0);
}

#[test]
fn test_invalidation_keeps_entity_state() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();
    ghost.set_scary(Some(true)).unwrap();

    engine.clear_all();
    let again: Ghost = engine.view(&entity).unwrap();
    assert_eq!(again.is_scary().unwrap(), Some(true));
}

#[test]
fn test_removed_child_leaves_stale_view() {
    let engine = ViewEngine::new();
    let parent = Entity::new();
    let child = parent.new_child(&[]);
    let id = child.id();
    let ghost: Ghost = engine.view(&child).unwrap();
    drop(child);

    assert!(!ghost.as_view().is_stale());
    parent.remove_child(id);
    assert!(ghost.as_view().is_stale());
    assert!(ghost.is_scary().is_err());
}
