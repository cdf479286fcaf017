//! The backend contract.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::id::EntityId;
use crate::query::{self, QueryOption};

/// A document store backend.
///
/// Stores hold JSON documents addressed by project, document type and id,
/// and guard every write with an optimistic version check.
///
/// # Invariants
///
/// - A successful `save` returns the id carrying the previous version + 1,
///   or version 1 for a new document.
/// - `save`/`delete` with a concrete version that differs from the stored
///   one fail with [`StoreError::OptimisticLocking`] and change nothing.
/// - `save`/`delete` with [`crate::Version::Unversioned`] never check.
/// - `find_n` distinguishes "collection absent" ([`StoreError::NotFound`])
///   from "nothing matched" (an empty list).
/// - Implementations must be `Send + Sync`; operations may run concurrently.
///
/// Only `save`, `delete`, `find_n` and `health_check` are required; `get`
/// and `find` are derived from `find_n`.
pub trait Store: Send + Sync {
    /// Inserts or replaces a document, returning its new id and version.
    ///
    /// # Errors
    ///
    /// - [`StoreError::OptimisticLocking`] on a version mismatch
    /// - [`StoreError::Serialization`] if `json` is not a JSON object
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId>;

    /// Removes a document. Removing an absent document succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OptimisticLocking`] if the document exists and
    /// its version differs from a concrete `id.version`.
    fn delete(&self, id: &EntityId) -> StoreResult<()>;

    /// Returns up to `max_results` matching documents, sorted per the last
    /// sort option. Truncation happens after sorting.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the project or document type does not exist
    /// - [`StoreError::UnsupportedQuery`], [`StoreError::MissingProperty`] or
    ///   [`StoreError::PropertyType`] for queries the documents cannot answer
    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>>;

    /// Checks that the backend is usable.
    fn health_check(&self) -> StoreResult<()>;

    /// Returns the first matching document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when nothing matches.
    fn find(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<Entity> {
        self.find_n(project, document_type, 1, options)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    /// Loads a document by id. The version in `id` is ignored.
    fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        self.find(&id.project, &id.document_type, &[query::id(id.id.as_str())])
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        (**self).save(id, json)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        (**self).find_n(project, document_type, max_results, options)
    }

    fn health_check(&self) -> StoreResult<()> {
        (**self).health_check()
    }

    fn find(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<Entity> {
        (**self).find(project, document_type, options)
    }

    fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        (**self).get(id)
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        (**self).save(id, json)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        (**self).find_n(project, document_type, max_results, options)
    }

    fn health_check(&self) -> StoreResult<()> {
        (**self).health_check()
    }

    fn find(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<Entity> {
        (**self).find(project, document_type, options)
    }

    fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        (**self).get(id)
    }
}
