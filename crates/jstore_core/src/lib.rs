//! # jstore core
//!
//! Backend-agnostic document storage for JSON entities.
//!
//! This crate provides:
//! - The entity model: [`EntityId`], [`Version`], [`Entity`], [`TypedEntity`]
//! - The query vocabulary in [`query`]: id lookup, typed comparisons, sorting
//! - The [`Store`] contract every backend implements
//! - A provider [`Registry`] resolving driver names to backends
//! - [`JStore`], typed marshalling over any store, and [`Bucket`], a store
//!   pinned to one project and document type
//! - [`Document`], the decode-time typed view of a stored body that
//!   backends evaluate queries against
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jstore_core::{query, Registry};
//!
//! let registry = Registry::new();
//! jstore_memory::register(&registry);
//!
//! let people = registry.new_bucket("memory", "", "hitchhikers", "person", &[])?;
//! people.marshal(&ford, &people.id("ford"))?;
//! let found: Person = people.unmarshal(&[query::gt("age", 40)])?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod document;
mod entity;
mod error;
mod id;
mod marshal;
pub mod query;
mod registry;
mod store;

#[cfg(test)]
mod test_support;

pub use bucket::Bucket;
pub use document::{Document, PropertyValue};
pub use entity::{Entity, TypedEntity};
pub use error::{StoreError, StoreResult};
pub use id::{EntityId, Version};
pub use marshal::JStore;
pub use query::{CompareOp, Comparison, QueryOption, QueryValue, SortOrder, StoreOption};
pub use registry::{ProviderFn, Registry};
pub use store::Store;
