//! A store view pinned to one project and document type.

use crate::entity::{Entity, TypedEntity};
use crate::error::StoreResult;
use crate::id::{EntityId, Version};
use crate::marshal::JStore;
use crate::query::QueryOption;
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A [`JStore`] restricted to one `(project, document_type)` collection.
///
/// Every id passed in is rewritten into the bucket's collection before it
/// reaches the store, so only its `id` and `version` matter.
///
/// ```
/// # use jstore_core::{Bucket, JStore};
/// # fn demo(store: &JStore) -> jstore_core::StoreResult<()> {
/// let people: Bucket = store.bucket("hitchhikers", "person");
/// let id = people.save(&people.id("ford"), r#"{"name":"Ford","age":42}"#)?;
/// let ford = people.get(&id)?;
/// # let _ = ford;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    store: JStore,
    project: String,
    document_type: String,
}

impl Bucket {
    /// Creates a bucket over `store`.
    pub fn new(
        store: JStore,
        project: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            store,
            project: project.into(),
            document_type: document_type.into(),
        }
    }

    /// Returns the project.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the document type.
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &JStore {
        &self.store
    }

    /// Builds an unversioned id inside this bucket.
    pub fn id(&self, id: impl Into<String>) -> EntityId {
        EntityId::new(&self.project, &self.document_type, id)
    }

    /// Builds a versioned id inside this bucket.
    pub fn versioned_id(&self, id: impl Into<String>, version: Version) -> EntityId {
        EntityId::with_version(&self.project, &self.document_type, id, version)
    }

    fn resolve(&self, id: &EntityId) -> EntityId {
        id.scoped(&self.project, &self.document_type)
    }

    /// See [`Store::save`].
    pub fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        self.store.save(&self.resolve(id), json)
    }

    /// See [`Store::delete`].
    pub fn delete(&self, id: &EntityId) -> StoreResult<()> {
        self.store.delete(&self.resolve(id))
    }

    /// See [`Store::get`].
    pub fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        self.store.get(&self.resolve(id))
    }

    /// See [`Store::find`].
    pub fn find(&self, options: &[QueryOption]) -> StoreResult<Entity> {
        self.store.find(&self.project, &self.document_type, options)
    }

    /// See [`Store::find_n`].
    pub fn find_n(
        &self,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        self.store
            .find_n(&self.project, &self.document_type, max_results, options)
    }

    /// See [`JStore::marshal`].
    pub fn marshal<T: Serialize + ?Sized>(
        &self,
        object: &T,
        id: &EntityId,
    ) -> StoreResult<EntityId> {
        self.store.marshal(object, &self.resolve(id))
    }

    /// See [`JStore::marshal_entity`].
    pub fn marshal_entity<T: Serialize>(
        &self,
        entity: &TypedEntity<T>,
    ) -> StoreResult<EntityId> {
        self.store.marshal(&entity.object, &self.resolve(&entity.id))
    }

    /// See [`JStore::unmarshal`].
    pub fn unmarshal<T: DeserializeOwned>(&self, options: &[QueryOption]) -> StoreResult<T> {
        self.store.unmarshal(&self.project, &self.document_type, options)
    }

    /// See [`JStore::unmarshal_entity`].
    pub fn unmarshal_entity<T: DeserializeOwned>(
        &self,
        options: &[QueryOption],
    ) -> StoreResult<TypedEntity<T>> {
        self.store
            .unmarshal_entity(&self.project, &self.document_type, options)
    }

    /// See [`JStore::find_n_as`].
    pub fn find_n_as<T: DeserializeOwned>(
        &self,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<TypedEntity<T>>> {
        self.store
            .find_n_as(&self.project, &self.document_type, max_results, options)
    }
}
