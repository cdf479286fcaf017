//! Typed binding on top of any [`Store`].

use crate::bucket::Bucket;
use crate::entity::{Entity, TypedEntity};
use crate::error::StoreResult;
use crate::id::EntityId;
use crate::query::QueryOption;
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A [`Store`] with JSON (de)serialization of application types.
///
/// `JStore` forwards every [`Store`] operation unchanged and adds typed
/// `marshal`/`unmarshal` helpers. Errors from the backend, including
/// [`crate::StoreError::NotFound`] and
/// [`crate::StoreError::OptimisticLocking`], pass through untouched.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct JStore {
    store: Arc<dyn Store>,
}

impl JStore {
    /// Wraps a backend.
    pub fn wrap(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wraps a shared backend.
    pub fn from_shared(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Serializes `object` and saves it under `id`.
    pub fn marshal<T: Serialize + ?Sized>(
        &self,
        object: &T,
        id: &EntityId,
    ) -> StoreResult<EntityId> {
        let json = serde_json::to_string(object)?;
        self.store.save(id, &json)
    }

    /// Saves a typed entity, checking against the version it was loaded with.
    pub fn marshal_entity<T: Serialize>(
        &self,
        entity: &TypedEntity<T>,
    ) -> StoreResult<EntityId> {
        self.marshal(&entity.object, &entity.id)
    }

    /// Finds the first matching document and deserializes it.
    pub fn unmarshal<T: DeserializeOwned>(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<T> {
        self.store.find(project, document_type, options)?.decode()
    }

    /// Finds the first matching document and binds it with its identity.
    pub fn unmarshal_entity<T: DeserializeOwned>(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<TypedEntity<T>> {
        TypedEntity::from_entity(self.store.find(project, document_type, options)?)
    }

    /// Typed [`Store::find_n`].
    pub fn find_n_as<T: DeserializeOwned>(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<TypedEntity<T>>> {
        self.store
            .find_n(project, document_type, max_results, options)?
            .into_iter()
            .map(TypedEntity::from_entity)
            .collect()
    }

    /// Returns a view restricted to one project and document type.
    pub fn bucket(
        &self,
        project: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Bucket {
        Bucket::new(self.clone(), project, document_type)
    }
}

impl Store for JStore {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        self.store.save(id, json)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        self.store.delete(id)
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        self.store.find_n(project, document_type, max_results, options)
    }

    fn health_check(&self) -> StoreResult<()> {
        self.store.health_check()
    }

    fn find(
        &self,
        project: &str,
        document_type: &str,
        options: &[QueryOption],
    ) -> StoreResult<Entity> {
        self.store.find(project, document_type, options)
    }

    fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        self.store.get(id)
    }
}

impl fmt::Debug for JStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JStore").finish_non_exhaustive()
    }
}
