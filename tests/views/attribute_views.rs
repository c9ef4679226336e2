//! Attribute getters and setters through typed adapters

use crate::common::{init_tracing, Ghost};
use facets::{AttributeKey, Entity, Error, Value, ViewEngine};
use proptest::prelude::*;

#[test]
fn test_soft_flag_round_trip() {
    init_tracing();
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();

    assert_eq!(ghost.is_scary().unwrap(), None);
    assert_eq!(ghost.set_scary(Some(true)).unwrap(), None);
    assert_eq!(ghost.is_scary().unwrap(), Some(true));
    assert_eq!(ghost.set_scary(None).unwrap(), Some(true));
    assert_eq!(ghost.is_scary().unwrap(), None);
}

#[test]
fn test_soft_remove_of_absent_is_not_an_error() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();
    assert_eq!(ghost.set_scary(None).unwrap(), None);
}

#[test]
fn test_strict_getter_on_missing_attribute() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();

    let err = ghost.health().unwrap_err();
    assert_eq!(err, Error::AttributeAbsent(AttributeKey::of::<i64>("health")));
    assert!(err.is_absent());
}

#[test]
fn test_strict_setter() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();

    ghost.set_health(Some(10)).unwrap();
    assert_eq!(ghost.health().unwrap(), 10);
    ghost.set_health(None).unwrap();
    assert!(matches!(ghost.set_health(None), Err(Error::AttributeAbsent(_))));
}

#[test]
fn test_writes_land_on_the_entity() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    let ghost: Ghost = engine.view(&entity).unwrap();
    ghost.set_scary(Some(false)).unwrap();

    assert_eq!(
        entity.get_attribute(&AttributeKey::of::<bool>("scary")),
        Some(Value::Bool(false))
    );
    assert_eq!(entity.attribute_count(), 1);
}

#[test]
fn test_same_name_different_type_is_a_different_attribute() {
    let engine = ViewEngine::new();
    let entity = Entity::new();
    entity
        .add_attribute(AttributeKey::of::<String>("scary"), "very".into())
        .unwrap();
    let ghost: Ghost = engine.view(&entity).unwrap();
    assert_eq!(ghost.is_scary().unwrap(), None);
}

proptest! {
    #[test]
    fn prop_last_write_wins(writes in proptest::collection::vec(proptest::option::of(any::<bool>()), 1..32)) {
        let engine = ViewEngine::new();
        let entity = Entity::new();
        let ghost: Ghost = engine.view(&entity).unwrap();

        let mut expected = None;
        for write in writes {
            let previous = ghost.set_scary(write).unwrap();
            prop_assert_eq!(previous, expected);
            expected = write;
        }
        prop_assert_eq!(ghost.is_scary().unwrap(), expected);
    }
}
