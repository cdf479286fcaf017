//! Backend checks against a running cluster.
//!
//! Ignored by default. Run with
//! `JSTORE_ELASTIC_URL=http://localhost:9200 cargo test -p jstore_elastic -- --ignored`.

#![cfg(feature = "http")]

use jstore_core::{Registry, Store, StoreOption};
use jstore_testkit::conformance;
use tracing_subscriber::EnvFilter;

fn cluster_url() -> String {
    std::env::var("JSTORE_ELASTIC_URL").unwrap_or_else(|_| "http://localhost:9200".to_string())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
#[ignore = "needs a running Elasticsearch cluster"]
fn elastic_store_conforms() {
    init_tracing();
    let registry = Registry::new();
    jstore_elastic::register(&registry);
    let store = registry
        .new_store(
            jstore_elastic::DRIVER_NAME,
            &cluster_url(),
            &[
                StoreOption::SyncUpdates,
                StoreOption::param("index_prefix", "jstore_it_"),
            ],
        )
        .expect("store builds");
    store.health_check().expect("cluster is reachable");
    conformance::run_all(&store);
}
