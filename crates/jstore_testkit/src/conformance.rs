//! Behavioral checks every backend must pass.
//!
//! Each check writes into a fresh project, so the checks can share one
//! store and run in any order. They assume writes are visible to reads
//! once a call returns; configure the store with
//! [`jstore_core::StoreOption::SyncUpdates`] where that is not the default.
//!
//! Checks panic with a description of the first violated expectation.

use crate::fixtures::{ford, unique_project, zaphod};
use jstore_core::query::{self, QueryOption};
use jstore_core::{Document, EntityId, Store, StoreError, Version};

/// Runs every check against `store`.
pub fn run_all<S: Store + ?Sized>(store: &S) {
    fresh_save_is_version_one(store);
    versioned_updates(store);
    stale_write_leaves_document_unchanged(store);
    round_trip_is_exact(store);
    find_n_truncates(store);
    sort_is_monotonic(store);
    last_sort_wins(store);
    delete_semantics(store);
    missing_collection_vs_no_match(store);
    find_ford_and_zaphod(store);
    health_check_passes(store);
}

fn person_id(project: &str, id: &str) -> EntityId {
    EntityId::new(project, "person", id)
}

fn scores(entities: &[jstore_core::Entity], property: &str) -> Vec<f64> {
    entities
        .iter()
        .map(|e| {
            Document::parse(&e.json)
                .and_then(|doc| doc.number(property))
                .expect("stored document carries the sorted property")
        })
        .collect()
}

/// Saving without a version yields version 1.
pub fn fresh_save_is_version_one<S: Store + ?Sized>(store: &S) {
    let project = unique_project("fresh");
    let saved = store
        .save(&person_id(&project, "ford"), &ford().to_json())
        .expect("save succeeds");
    assert_eq!(saved.version, Version::At(1), "first save must yield version 1");
    assert_eq!(saved.project, project);
    assert_eq!(saved.document_type, "person");
    assert_eq!(saved.id, "ford");
}

/// Version 1, then 2 via the current version, then a stale write fails.
pub fn versioned_updates<S: Store + ?Sized>(store: &S) {
    let project = unique_project("versions");
    let x = EntityId::new(&project, "thing", "x");

    let v1 = store.save(&x, r#"{"n":1}"#).expect("first save");
    assert_eq!(v1.version, Version::At(1));

    let v2 = store.save(&v1, r#"{"n":2}"#).expect("save at current version");
    assert_eq!(v2.version, Version::At(2));

    let err = store
        .save(&v1, r#"{"n":3}"#)
        .expect_err("stale save must fail");
    assert!(err.is_optimistic_locking(), "unexpected error: {err}");
    assert_eq!(store.get(&x).expect("document present").version(), Version::At(2));

    let v3 = store.save(&x, r#"{"n":3}"#).expect("unversioned save");
    assert_eq!(v3.version, Version::At(3));
}

/// A rejected write must not change the stored body.
pub fn stale_write_leaves_document_unchanged<S: Store + ?Sized>(store: &S) {
    let project = unique_project("stale");
    let id = person_id(&project, "ford");
    let v1 = store.save(&id, r#"{"age":42}"#).expect("save");
    store.save(&v1, r#"{"age":43}"#).expect("update");

    assert!(store.save(&v1, r#"{"age":99}"#).is_err());
    assert!(store.delete(&v1).is_err(), "stale delete must fail");

    let stored = store.get(&id).expect("document still present");
    assert_eq!(stored.json, r#"{"age":43}"#);
}

/// A saved body comes back byte for byte.
pub fn round_trip_is_exact<S: Store + ?Sized>(store: &S) {
    let project = unique_project("roundtrip");
    let body = r#"{"name":"Ford","age":42,"tags":["towel"],"nested":{"ok":true}}"#;
    let saved = store
        .save(&person_id(&project, "ford"), body)
        .expect("save");

    let by_get = store.get(&saved).expect("get");
    assert_eq!(by_get.json, body);
    assert_eq!(by_get.id, saved);

    let by_find = store
        .find(&project, "person", &[query::id("ford")])
        .expect("find");
    assert_eq!(by_find.json, body);
}

/// `find_n` returns exactly `k` of `n > k` matches.
pub fn find_n_truncates<S: Store + ?Sized>(store: &S) {
    let project = unique_project("truncate");
    for i in 0..10 {
        store
            .save(&person_id(&project, &format!("p{i}")), &format!(r#"{{"age":{i}}}"#))
            .expect("save");
    }
    for k in [0, 1, 3, 10] {
        let found = store.find_n(&project, "person", k, &[]).expect("find_n");
        assert_eq!(found.len(), k, "find_n({k}) over 10 documents");
    }
    let capped = store.find_n(&project, "person", 100, &[]).expect("find_n");
    assert_eq!(capped.len(), 10);

    let filtered = store
        .find_n(&project, "person", 2, &[query::gte("age", 5)])
        .expect("find_n");
    assert_eq!(filtered.len(), 2);
}

/// Ascending sorts are non-decreasing, descending sorts non-increasing, and
/// both apply before truncation.
pub fn sort_is_monotonic<S: Store + ?Sized>(store: &S) {
    let project = unique_project("sort");
    for (i, age) in [17, 3, 99, 42, 3, 64].into_iter().enumerate() {
        store
            .save(&person_id(&project, &format!("p{i}")), &format!(r#"{{"age":{age}}}"#))
            .expect("save");
    }

    let ascending = store
        .find_n(&project, "person", 6, &[query::asc("age")])
        .expect("ascending");
    let ages = scores(&ascending, "age");
    assert!(ages.windows(2).all(|w| w[0] <= w[1]), "not ascending: {ages:?}");

    let descending = store
        .find_n(&project, "person", 6, &[query::desc("age")])
        .expect("descending");
    let ages = scores(&descending, "age");
    assert!(ages.windows(2).all(|w| w[0] >= w[1]), "not descending: {ages:?}");

    let top = store
        .find_n(&project, "person", 2, &[query::desc("age")])
        .expect("top two");
    assert_eq!(scores(&top, "age"), vec![99.0, 64.0]);
}

/// With several sort options only the last one applies.
pub fn last_sort_wins<S: Store + ?Sized>(store: &S) {
    let project = unique_project("lastsort");
    for (id, age) in [("a", 3), ("b", 1), ("c", 2)] {
        store
            .save(&person_id(&project, id), &format!(r#"{{"age":{age}}}"#))
            .expect("save");
    }
    let options: [QueryOption; 2] = [query::asc("age"), query::desc("age")];
    let found = store.find_n(&project, "person", 3, &options).expect("find_n");
    assert_eq!(scores(&found, "age"), vec![3.0, 2.0, 1.0]);
}

/// Deleting is idempotent and makes the document unfindable.
pub fn delete_semantics<S: Store + ?Sized>(store: &S) {
    let project = unique_project("delete");
    let missing = person_id(&project, "nobody");
    store.delete(&missing).expect("delete of absent document");

    let id = person_id(&project, "ford");
    let saved = store.save(&id, &ford().to_json()).expect("save");
    store.delete(&saved).expect("delete at current version");

    let err = store.get(&id).expect_err("deleted document is gone");
    assert!(err.is_not_found(), "unexpected error: {err}");
    store.delete(&id).expect("second delete");
}

/// An absent collection is `NotFound`; an existing one with no matches is empty.
pub fn missing_collection_vs_no_match<S: Store + ?Sized>(store: &S) {
    let project = unique_project("empty");
    match store.find_n(&project, "person", 10, &[]) {
        Err(StoreError::NotFound) => {}
        other => panic!("never-written collection must be NotFound, got {other:?}"),
    }

    store
        .save(&person_id(&project, "ford"), &ford().to_json())
        .expect("save");
    let none = store
        .find_n(&project, "person", 10, &[query::id("arthur")])
        .expect("existing collection answers");
    assert!(none.is_empty());
}

/// The Ford and Zaphod walkthrough.
pub fn find_ford_and_zaphod<S: Store + ?Sized>(store: &S) {
    let project = unique_project("hitchhikers");
    store
        .save(&person_id(&project, "ford"), &ford().to_json())
        .expect("save ford");

    let found = store
        .find(&project, "person", &[query::eq("age", 42)])
        .expect("ford by age");
    assert_eq!(found.id.id, "ford");
    assert_eq!(found.json, ford().to_json());

    store
        .save(&person_id(&project, "zaphod"), &zaphod().to_json())
        .expect("save zaphod");

    let older = store
        .find_n(&project, "person", 10, &[query::gt("age", 42)])
        .expect("older than ford");
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].id.id, "zaphod");

    let by_name = store
        .find(&project, "person", &[query::eq("name", "Zaphod")])
        .expect("zaphod by name");
    assert_eq!(by_name.id.id, "zaphod");

    let err = store
        .find(&project, "person", &[query::gt("age", 4200)])
        .expect_err("nobody is older than zaphod");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

/// The health check passes on a usable store.
pub fn health_check_passes<S: Store + ?Sized>(store: &S) {
    store.health_check().expect("healthy store");
}
