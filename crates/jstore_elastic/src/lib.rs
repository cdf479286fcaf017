//! # jstore Elasticsearch backend
//!
//! A [`jstore_core::Store`] keeping each `(project, document_type)` pair in
//! its own Elasticsearch index. Query options compile to the cluster's query
//! DSL with [`compile_query`]:
//!
//! - `Id` becomes an `ids` filter
//! - String equality becomes a `term` on the keyword sub-field
//! - Number and timestamp comparisons become `term` or `range` filters
//! - The last sort option becomes the search `sort`
//!
//! The store sends requests through a [`Transport`]. With the default `http`
//! feature, [`ElasticStore::connect`] drives the official `elasticsearch`
//! client on a runtime the transport owns, and
//! [`register`] makes the backend available as [`DRIVER_NAME`]:
//!
//! ```rust,no_run
//! use jstore_core::{query, Registry, StoreOption};
//!
//! let registry = Registry::new();
//! jstore_elastic::register(&registry);
//! let store = registry
//!     .new_store(
//!         jstore_elastic::DRIVER_NAME,
//!         "http://localhost:9200",
//!         &[StoreOption::SyncUpdates],
//!     )
//!     .unwrap();
//! let people = store.bucket("hitchhikers", "person");
//! let ford = people.find(&[query::eq("name", "Ford")]).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod query;
mod response;
mod store;
mod transport;

pub use config::{ElasticConfig, IndexNaming, RefreshPolicy};
pub use query::{compile_query, SortField};
pub use store::ElasticStore;
pub use transport::{Method, MockTransport, Request, Response, Transport, TransportError};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Driver name the Elasticsearch provider registers under.
pub const DRIVER_NAME: &str = "elastic";

/// Registers the Elasticsearch provider with `registry`.
///
/// The connection source is the cluster base URL; see
/// [`ElasticConfig::from_source`] for the options it understands.
#[cfg(feature = "http")]
pub fn register(registry: &jstore_core::Registry) {
    use jstore_core::{Store, StoreOption, StoreResult};

    registry.register(
        DRIVER_NAME,
        |source: &str, options: &[StoreOption]| -> StoreResult<Box<dyn Store>> {
            Ok(Box::new(ElasticStore::from_source(source, options)?))
        },
    );
}
