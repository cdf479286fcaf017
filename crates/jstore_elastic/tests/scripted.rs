//! Store flows against a scripted cluster.

use jstore_core::{
    query, EntityId, JStore, Registry, Store, StoreError, StoreOption, TypedEntity, Version,
};
use jstore_elastic::{ElasticConfig, ElasticStore, Method, MockTransport, RefreshPolicy};
use jstore_testkit::{ford, Person};
use serde_json::json;
use std::sync::Arc;
use url::Url;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn scripted() -> (Arc<MockTransport>, ElasticStore<Arc<MockTransport>>) {
    init_tracing();
    let transport = Arc::new(MockTransport::new());
    let config = ElasticConfig::new(Url::parse("http://es:9200").unwrap())
        .index_prefix("it_")
        .refresh(RefreshPolicy::WaitFor);
    let store = ElasticStore::with_transport(config, Arc::clone(&transport));
    (transport, store)
}

fn lookup_reply(version: u64, seq_no: u64, source: &str) -> String {
    format!(
        r#"{{"_index":"it_48_itchhikers-person","_id":"ford","_version":{version},"_seq_no":{seq_no},"_primary_term":2,"found":true,"_source":{source}}}"#
    )
}

#[test]
fn read_modify_write_through_marshal_layer() {
    let (transport, store) = scripted();
    let jstore = JStore::wrap(store);
    let people = jstore.bucket("Hitchhikers", "person");

    transport.push_json(201, json!({ "_version": 1, "result": "created" }));
    let saved = people.marshal(&ford(), &people.id("ford")).unwrap();
    assert_eq!(saved.version, Version::At(1));

    transport.push_response(200, lookup_reply(1, 0, &ford().to_json()));
    let entity = people.get(&people.id("ford")).unwrap();
    let mut person: Person = entity.decode().unwrap();
    person.age += 1;

    transport.push_response(200, lookup_reply(1, 0, &ford().to_json()));
    transport.push_json(200, json!({ "_version": 2, "result": "updated" }));
    let updated = people.marshal(&person, &entity.id).unwrap();
    assert_eq!(updated.version, Version::At(2));

    let requests = transport.requests();
    let methods: Vec<Method> = requests.iter().map(|r| r.method).collect();
    assert_eq!(
        methods,
        vec![Method::Put, Method::Get, Method::Get, Method::Put]
    );
    let write = &requests[3];
    assert_eq!(write.path(), "/it_48_itchhikers-person/_doc/ford");
    assert_eq!(write.query_param("if_seq_no"), Some("0"));
    assert_eq!(write.query_param("if_primary_term"), Some("2"));
    assert_eq!(write.query_param("refresh"), Some("wait_for"));
    let body: Person = serde_json::from_str(write.body.as_deref().unwrap()).unwrap();
    assert_eq!(body.age, 43);
    assert_eq!(transport.pending(), 0);
}

#[test]
fn unmarshal_runs_a_single_hit_search() {
    let (transport, store) = scripted();
    let jstore = JStore::wrap(store);

    transport.push_response(
        200,
        r#"{"hits":{"total":{"value":1},"hits":[
            {"_id":"ford","_version":3,"_source":{"name":"Ford","age":42}}]}}"#,
    );
    let person: TypedEntity<Person> = jstore
        .unmarshal_entity("hitchhikers", "person", &[query::eq("name", "Ford")])
        .unwrap();
    assert_eq!(person.object, ford());
    assert_eq!(person.version(), Version::At(3));

    let search = transport.last_request().unwrap();
    let body: serde_json::Value = serde_json::from_str(search.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["size"], 1);
    assert_eq!(
        body["query"]["bool"]["filter"][0],
        json!({ "term": { "name.keyword": "Ford" } })
    );
}

#[test]
fn empty_search_is_not_found_for_find() {
    let (transport, store) = scripted();
    transport.push_json(200, json!({ "hits": { "hits": [] } }));
    let err = store
        .find("hitchhikers", "person", &[query::id("marvin")])
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn concurrent_writer_surfaces_as_optimistic_locking() {
    let (transport, store) = scripted();
    transport.push_response(200, lookup_reply(4, 10, "{}"));
    transport.push_json(
        409,
        json!({ "error": { "type": "version_conflict_engine_exception", "reason": "[ford]: version conflict" } }),
    );
    transport.push_response(200, lookup_reply(5, 11, "{}"));

    let id = EntityId::with_version("hitchhikers", "person", "ford", Version::At(4));
    match store.save(&id, "{}") {
        Err(StoreError::OptimisticLocking {
            id: rejected,
            expected,
            actual,
        }) => {
            assert_eq!(rejected.id, "ford");
            assert_eq!(expected, Version::At(4));
            assert_eq!(actual, Version::At(5));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn sorted_search_checks_the_field_mapping() {
    let (transport, store) = scripted();
    transport.push_json(
        200,
        json!({ "it_hitchhikers-person": { "mappings": { "name": { "full_name": "name",
            "mapping": { "name": { "type": "text",
                "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } } } } } } } }),
    );
    transport.push_json(200, json!({ "hits": { "hits": [] } }));

    store
        .find_n("hitchhikers", "person", 3, &[query::asc("age"), query::desc("name")])
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].path(), "/it_hitchhikers-person/_mapping/field/name");
    let body: serde_json::Value =
        serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["sort"], json!([{ "name.keyword": { "order": "desc" } }]));
}

#[test]
fn deleting_twice_is_fine() {
    let (transport, store) = scripted();
    transport.push_json(200, json!({ "result": "deleted", "_version": 2 }));
    transport.push_json(404, json!({ "result": "not_found", "_version": 3 }));

    let id = EntityId::new("hitchhikers", "person", "ford");
    store.delete(&id).unwrap();
    store.delete(&id).unwrap();
    assert!(transport
        .requests()
        .iter()
        .all(|r| r.method == Method::Delete));
}

#[test]
fn health_check_follows_cluster_status() {
    let (transport, store) = scripted();
    transport.push_json(200, json!({ "cluster_name": "es", "status": "yellow" }));
    store.health_check().unwrap();

    transport.push_json(200, json!({ "cluster_name": "es", "status": "red" }));
    assert!(matches!(
        store.health_check(),
        Err(StoreError::Backend { .. })
    ));
    assert_eq!(transport.last_request().unwrap().path(), "/_cluster/health");
}

#[test]
fn registry_builds_http_stores_without_contacting_the_cluster() {
    let registry = Registry::new();
    jstore_elastic::register(&registry);
    assert!(registry.contains(jstore_elastic::DRIVER_NAME));

    registry
        .new_store(
            jstore_elastic::DRIVER_NAME,
            "http://127.0.0.1:1",
            &[StoreOption::SyncUpdates],
        )
        .unwrap();

    let err = registry
        .new_store(jstore_elastic::DRIVER_NAME, "", &[])
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig { .. }));

    let err = registry
        .new_store(
            jstore_elastic::DRIVER_NAME,
            "http://127.0.0.1:1",
            &[StoreOption::param("replicas", "2")],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig { .. }));
}
