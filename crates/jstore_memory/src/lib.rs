//! # jstore memory backend
//!
//! A [`jstore_core::Store`] that keeps documents in process memory. It is the
//! reference implementation of the query semantics every backend follows:
//!
//! - Filters are conjunctive and every one of them is evaluated
//! - String properties support equality only
//! - Integers and floats compare numerically, timestamps chronologically
//! - Results are sorted by the last sort option, then truncated
//!
//! Register it under [`DRIVER_NAME`] to make it available through a
//! [`Registry`]:
//!
//! ```rust
//! use jstore_core::{Registry, Store};
//!
//! let registry = Registry::new();
//! jstore_memory::register(&registry);
//! let store = registry.new_store(jstore_memory::DRIVER_NAME, "", &[]).unwrap();
//! assert!(store.health_check().is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod matcher;
mod sort;
mod store;

pub use config::MemoryConfig;
pub use store::MemoryStore;

use jstore_core::{Registry, Store, StoreOption, StoreResult};

/// Driver name the memory provider registers under.
pub const DRIVER_NAME: &str = "memory";

/// Registers the memory provider with `registry`.
pub fn register(registry: &Registry) {
    registry.register(
        DRIVER_NAME,
        |source: &str, options: &[StoreOption]| -> StoreResult<Box<dyn Store>> {
            Ok(Box::new(MemoryStore::from_source(source, options)?))
        },
    );
}
