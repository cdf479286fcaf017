//! # jstore testkit
//!
//! Test utilities for jstore backends.
//!
//! This crate provides:
//! - Fixture types and sample documents
//! - Property-based test generators using proptest
//! - A conformance suite any [`jstore_core::Store`] with synchronous
//!   visibility must pass
//! - Concurrent writer stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jstore_testkit::conformance;
//!
//! #[test]
//! fn memory_store_conforms() {
//!     conformance::run_all(&jstore_memory::MemoryStore::new());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod conformance;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
