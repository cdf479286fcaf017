//! The in-memory store.

use crate::config::MemoryConfig;
use crate::matcher;
use crate::sort;
use jstore_core::query::effective_sort;
use jstore_core::{
    Document, Entity, EntityId, QueryOption, Store, StoreError, StoreOption, StoreResult, Version,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// A saved document together with its decoded view.
#[derive(Debug, Clone)]
struct StoredItem {
    entity: Entity,
    document: Document,
}

/// Documents of one document type, ordered by id.
type Collection = BTreeMap<String, StoredItem>;

/// Project name to document type to collection.
type Projects = HashMap<String, HashMap<String, Collection>>;

/// A [`Store`] keeping every document in process memory.
///
/// Documents are decoded once on save, so queries never re-parse JSON.
/// Writes are visible to reads as soon as they return.
///
/// # Thread Safety
///
/// All state sits behind one lock. Saves and deletes hold it exclusively
/// across the version check and the write, so concurrent writers with the
/// same expected version cannot both succeed.
///
/// # Example
///
/// ```rust
/// use jstore_core::{query, EntityId, Store};
/// use jstore_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// let id = store
///     .save(&EntityId::new("hitchhikers", "person", "ford"), r#"{"age":42}"#)
///     .unwrap();
/// assert_eq!(id.version.as_u64(), Some(1));
///
/// let found = store
///     .find("hitchhikers", "person", &[query::gt("age", 40)])
///     .unwrap();
/// assert_eq!(found.id.id, "ford");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<Projects>,
}

impl MemoryStore {
    /// Creates an empty store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&MemoryConfig::default())
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(config: &MemoryConfig) -> Self {
        Self {
            projects: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
        }
    }

    /// Creates a store from a provider's connection source and options.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the options are rejected.
    pub fn from_source(connection_source: &str, options: &[StoreOption]) -> StoreResult<Self> {
        let config = MemoryConfig::from_source(connection_source, options)?;
        Ok(Self::with_config(&config))
    }

    /// Returns the total number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects
            .read()
            .values()
            .flat_map(HashMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    /// Returns true if no documents are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every project.
    pub fn clear(&self) {
        self.projects.write().clear();
    }
}

fn check_version(id: &EntityId, existing: Option<&StoredItem>) -> StoreResult<Version> {
    let Some(existing) = existing else {
        return Ok(Version::Unversioned);
    };
    let current = existing.entity.version();
    if !id.version.matches(current) {
        warn!(
            entity = %id,
            actual = %current,
            "optimistic locking rejected write"
        );
        return Err(StoreError::optimistic_locking(id, current));
    }
    Ok(current)
}

impl Store for MemoryStore {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        let document = Document::parse(json)?;

        let mut projects = self.projects.write();
        let collection = projects
            .entry(id.project.clone())
            .or_default()
            .entry(id.document_type.clone())
            .or_default();

        let current = check_version(id, collection.get(&id.id))?;
        let saved = id.at(current.next());
        collection.insert(
            id.id.clone(),
            StoredItem {
                entity: Entity::new(saved.clone(), json),
                document,
            },
        );
        debug!(entity = %saved, "saved document");
        Ok(saved)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        let mut projects = self.projects.write();
        let Some(collection) = projects
            .get_mut(&id.project)
            .and_then(|types| types.get_mut(&id.document_type))
        else {
            debug!(entity = %id, "delete of document in absent collection");
            return Ok(());
        };

        check_version(id, collection.get(&id.id))?;
        let removed = collection.remove(&id.id).is_some();
        debug!(entity = %id, removed, "deleted document");
        Ok(())
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        let projects = self.projects.read();
        let collection = projects
            .get(project)
            .and_then(|types| types.get(document_type))
            .ok_or(StoreError::NotFound)?;

        let mut matched = Vec::new();
        for item in collection.values() {
            if matcher::evaluate(&item.entity.id.id, &item.document, options)? {
                matched.push(item);
            }
        }

        if let Some(order) = effective_sort(options) {
            sort::sort_by_property(&mut matched, order, |item| &item.document)?;
        }
        matched.truncate(max_results);

        debug!(
            project,
            document_type,
            max_results,
            found = matched.len(),
            "find completed"
        );
        Ok(matched.into_iter().map(|item| item.entity.clone()).collect())
    }

    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jstore_core::query;

    fn id(name: &str) -> EntityId {
        EntityId::new("proj", "person", name)
    }

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.health_check().is_ok());
    }

    #[test]
    fn save_assigns_increasing_versions() {
        let store = MemoryStore::new();
        let v1 = store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        assert_eq!(v1.version, Version::At(1));
        let v2 = store.save(&v1, r#"{"age":43}"#).unwrap();
        assert_eq!(v2.version, Version::At(2));
        let v3 = store.save(&id("ford"), r#"{"age":44}"#).unwrap();
        assert_eq!(v3.version, Version::At(3));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_save_changes_nothing() {
        let store = MemoryStore::new();
        let v1 = store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        store.save(&v1, r#"{"age":43}"#).unwrap();

        match store.save(&v1, r#"{"age":99}"#) {
            Err(StoreError::OptimisticLocking {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Version::At(1));
                assert_eq!(actual, Version::At(2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let stored = store.get(&id("ford")).unwrap();
        assert_eq!(stored.json, r#"{"age":43}"#);
        assert_eq!(stored.version(), Version::At(2));
    }

    #[test]
    fn versioned_create_starts_at_one() {
        let store = MemoryStore::new();
        let fresh = id("ford").at(Version::At(5));
        let saved = store.save(&fresh, r#"{"age":42}"#).unwrap();
        assert_eq!(saved.version, Version::At(1));
    }

    #[test]
    fn invalid_json_is_rejected_without_side_effects() {
        let store = MemoryStore::new();
        let err = store.save(&id("ford"), "not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        let err = store.save(&id("ford"), "[1,2]").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(store.find_n("proj", "person", 10, &[]).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_checks_version() {
        let store = MemoryStore::new();
        let v1 = store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        store.save(&v1, r#"{"age":43}"#).unwrap();

        assert!(store.delete(&v1).unwrap_err().is_optimistic_locking());
        assert!(store.get(&id("ford")).is_ok());

        store.delete(&id("ford")).unwrap();
        assert!(store.get(&id("ford")).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_of_absent_document_succeeds() {
        let store = MemoryStore::new();
        store.delete(&id("nobody")).unwrap();
        store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        store.delete(&id("nobody").at(Version::At(3))).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn absent_collection_vs_no_match() {
        let store = MemoryStore::new();
        assert!(store.find_n("proj", "person", 10, &[]).unwrap_err().is_not_found());

        store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        assert!(store.find_n("proj", "ship", 10, &[]).unwrap_err().is_not_found());
        assert!(store.find_n("other", "person", 10, &[]).unwrap_err().is_not_found());

        let none = store
            .find_n("proj", "person", 10, &[query::gt("age", 100)])
            .unwrap();
        assert!(none.is_empty());

        // An emptied collection still exists.
        store.delete(&id("ford")).unwrap();
        assert!(store.find_n("proj", "person", 10, &[]).unwrap().is_empty());
    }

    #[test]
    fn sort_happens_before_truncation() {
        let store = MemoryStore::new();
        for (name, age) in [("a", 30), ("b", 10), ("c", 50), ("d", 20)] {
            store.save(&id(name), &format!(r#"{{"age":{age}}}"#)).unwrap();
        }
        let top = store
            .find_n("proj", "person", 2, &[query::desc("age")])
            .unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.id.id.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn unsorted_results_come_in_id_order() {
        let store = MemoryStore::new();
        for name in ["zaphod", "arthur", "ford"] {
            store.save(&id(name), r#"{"x":1}"#).unwrap();
        }
        let all = store.find_n("proj", "person", 10, &[]).unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.id.id.as_str()).collect();
        assert_eq!(names, vec!["arthur", "ford", "zaphod"]);
    }

    #[test]
    fn zero_max_results_returns_empty() {
        let store = MemoryStore::new();
        store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        assert!(store.find_n("proj", "person", 0, &[]).unwrap().is_empty());
    }

    #[test]
    fn query_errors_surface() {
        let store = MemoryStore::new();
        store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        let err = store
            .find_n("proj", "person", 10, &[query::eq("name", "Ford")])
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingProperty { .. }));
    }

    #[test]
    fn clear_drops_everything() {
        let store = MemoryStore::new();
        store.save(&id("ford"), r#"{"age":42}"#).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.get(&id("ford")).unwrap_err().is_not_found());
    }
}
