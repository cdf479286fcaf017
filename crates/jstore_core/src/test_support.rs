//! Minimal store used by this crate's unit tests.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::id::EntityId;
use crate::query::QueryOption;
use crate::store::Store;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Records every id it sees and answers id lookups only.
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub(crate) seen: Mutex<Vec<EntityId>>,
    docs: Mutex<BTreeMap<(String, String, String), Entity>>,
}

impl Store for RecordingStore {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        self.seen.lock().push(id.clone());
        let key = (id.project.clone(), id.document_type.clone(), id.id.clone());
        let mut docs = self.docs.lock();
        let current = docs.get(&key).map(Entity::version).unwrap_or_default();
        if docs.contains_key(&key) && !id.version.matches(current) {
            return Err(StoreError::optimistic_locking(id, current));
        }
        let saved = id.at(current.next());
        docs.insert(key, Entity::new(saved.clone(), json));
        Ok(saved)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        self.seen.lock().push(id.clone());
        self.docs
            .lock()
            .remove(&(id.project.clone(), id.document_type.clone(), id.id.clone()));
        Ok(())
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        let docs = self.docs.lock();
        let in_collection: Vec<&Entity> = docs
            .values()
            .filter(|e| e.id.project == project && e.id.document_type == document_type)
            .collect();
        if in_collection.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(in_collection
            .into_iter()
            .filter(|e| {
                options.iter().all(|o| match o {
                    QueryOption::Id(v) => &e.id.id == v,
                    _ => true,
                })
            })
            .take(max_results)
            .cloned()
            .collect())
    }

    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
