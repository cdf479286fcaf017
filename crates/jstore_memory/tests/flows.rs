//! End-to-end flows through the registry, typed marshalling and buckets.

use chrono::{TimeZone, Utc};
use jstore_core::{query, Bucket, Registry, Store, StoreError, TypedEntity, Version};
use jstore_memory::MemoryStore;
use jstore_testkit::{arthur, fleet, ford, unique_project, zaphod, Person, Spaceship};

fn bucket(document_type: &str) -> Bucket {
    let registry = Registry::new();
    jstore_memory::register(&registry);
    registry
        .new_bucket("memory", "", &unique_project("flows"), document_type, &[])
        .unwrap()
}

#[test]
fn provider_is_listed() {
    let registry = Registry::new();
    assert!(!registry.contains("memory"));
    jstore_memory::register(&registry);
    assert_eq!(registry.provider_names(), vec!["memory"]);
}

#[test]
fn provider_rejects_unknown_params() {
    let registry = Registry::new();
    jstore_memory::register(&registry);
    let err = registry
        .new_store("memory", "", &[jstore_core::StoreOption::param("bogus", "1")])
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig { .. }));
}

#[test]
fn marshal_then_query_people() {
    let people = bucket("person");
    for (id, person) in [("ford", ford()), ("zaphod", zaphod()), ("arthur", arthur())] {
        let saved = people.marshal(&person, &people.id(id)).unwrap();
        assert_eq!(saved.version, Version::At(1));
    }

    let found: Person = people.unmarshal(&[query::eq("name", "Ford")]).unwrap();
    assert_eq!(found, ford());

    let youngest: Vec<TypedEntity<Person>> =
        people.find_n_as(1, &[query::asc("age")]).unwrap();
    assert_eq!(youngest[0].object, arthur());

    let oldest_first: Vec<TypedEntity<Person>> =
        people.find_n_as(10, &[query::gt("age", 18), query::desc("age")]).unwrap();
    let names: Vec<&str> = oldest_first.iter().map(|e| e.object.name.as_str()).collect();
    assert_eq!(names, vec!["Zaphod", "Ford", "Arthur"]);

    let err = people
        .unmarshal::<Person>(&[query::gt("age", 4200)])
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn typed_read_modify_write() {
    let people = bucket("person");
    people.marshal(&ford(), &people.id("ford")).unwrap();

    let mut loaded: TypedEntity<Person> = people.unmarshal_entity(&[query::id("ford")]).unwrap();
    let stale = loaded.clone();

    loaded.object.age += 1;
    let saved = people.marshal_entity(&loaded).unwrap();
    assert_eq!(saved.version, Version::At(2));

    let err = people.marshal_entity(&stale).unwrap_err();
    assert!(err.is_optimistic_locking());

    let current: Person = people.unmarshal(&[query::id("ford")]).unwrap();
    assert_eq!(current.age, 43);
}

#[test]
fn ships_by_float_and_timestamp() {
    let ships = bucket("ship");
    for (id, ship) in fleet() {
        ships.marshal(&ship, &ships.id(id)).unwrap();
    }

    let fast: Vec<TypedEntity<Spaceship>> =
        ships.find_n_as(10, &[query::gte("speed", 7.7e7)]).unwrap();
    assert_eq!(fast.len(), 2);

    let cutoff = Utc.with_ymd_and_hms(1981, 1, 1, 0, 0, 0).unwrap();
    let newer: Vec<TypedEntity<Spaceship>> = ships
        .find_n_as(10, &[query::gt("commissioned", cutoff), query::asc("commissioned")])
        .unwrap();
    let ids: Vec<&str> = newer.iter().map(|e| e.id.id.as_str()).collect();
    assert_eq!(ids, vec!["bistromath", "heart-of-gold"]);

    let err = ships
        .find_n(10, &[query::lt("name", "Z")])
        .unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedQuery { .. }));
}

#[test]
fn buckets_share_one_store() {
    let store = jstore_core::JStore::wrap(MemoryStore::new());
    let project = unique_project("shared");
    let people = store.bucket(project.as_str(), "person");
    let ships = store.bucket(project.as_str(), "ship");

    people.marshal(&ford(), &people.id("ford")).unwrap();
    assert!(ships.find_n(10, &[]).unwrap_err().is_not_found());

    let via_store = store
        .get(&jstore_core::EntityId::new(project.as_str(), "person", "ford"))
        .unwrap();
    assert_eq!(via_store.decode::<Person>().unwrap(), ford());

    // Ids from another collection are pulled into the bucket.
    let foreign = ships.id("ford");
    assert_eq!(people.get(&foreign).unwrap().id.document_type, "person");
}

#[test]
fn delete_through_bucket() {
    let people = bucket("person");
    let saved = people.marshal(&ford(), &people.id("ford")).unwrap();
    let updated = people.save(&saved, &Person::new("Ford", 43).to_json()).unwrap();

    assert!(people.delete(&saved).unwrap_err().is_optimistic_locking());
    people.delete(&updated).unwrap();
    assert!(people.get(&saved).unwrap_err().is_not_found());
    assert!(people.find_n(10, &[]).unwrap().is_empty());
}
