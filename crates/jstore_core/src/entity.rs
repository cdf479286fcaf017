//! Stored documents and their typed wrapper.

use crate::error::StoreResult;
use crate::id::{EntityId, Version};
use serde::de::DeserializeOwned;

/// A stored document: its identity plus the canonical JSON body.
///
/// Entities are values. An update never mutates an `Entity` in place; the
/// store hands back a new one carrying the incremented version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Identity and version of the document.
    pub id: EntityId,
    /// Serialized JSON body, exactly as saved.
    pub json: String,
}

impl Entity {
    /// Creates an entity.
    pub fn new(id: EntityId, json: impl Into<String>) -> Self {
        Self {
            id,
            json: json.into(),
        }
    }

    /// Returns the stored version.
    pub fn version(&self) -> Version {
        self.id.version
    }

    /// Parses the body into a generic JSON value.
    pub fn value(&self) -> StoreResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.json)?)
    }

    /// Deserializes the body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_str(&self.json)?)
    }
}

/// An object bound to the identity and version it was loaded with.
///
/// Loading through [`crate::JStore::unmarshal_entity`] fills all three
/// fields; saving through [`crate::JStore::marshal_entity`] writes `object`
/// back using `id.version` as the expected version, so an edit of a stale
/// copy fails instead of overwriting a newer one.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedEntity<T> {
    /// Identity and version of the document.
    pub id: EntityId,
    /// JSON body the object was decoded from.
    pub json: String,
    /// The decoded object.
    pub object: T,
}

impl<T: DeserializeOwned> TypedEntity<T> {
    /// Decodes an entity's body.
    pub fn from_entity(entity: Entity) -> StoreResult<Self> {
        let object = entity.decode()?;
        Ok(Self {
            id: entity.id,
            json: entity.json,
            object,
        })
    }
}

impl<T> TypedEntity<T> {
    /// Returns the version the object was loaded with.
    pub fn version(&self) -> Version {
        self.id.version
    }

    /// Drops the metadata and returns the object.
    pub fn into_inner(self) -> T {
        self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: i64,
    }

    #[test]
    fn decode_body() {
        let entity = Entity::new(
            EntityId::with_version("p", "person", "ford", Version::At(1)),
            r#"{"name":"Ford","age":42}"#,
        );
        let person: Person = entity.decode().unwrap();
        assert_eq!(
            person,
            Person {
                name: "Ford".into(),
                age: 42
            }
        );
        assert_eq!(entity.value().unwrap()["age"], 42);
    }

    #[test]
    fn decode_invalid_body_fails() {
        let entity = Entity::new(EntityId::new("p", "t", "x"), "not json");
        assert!(entity.decode::<Person>().is_err());
    }

    #[test]
    fn typed_entity_keeps_metadata() {
        let entity = Entity::new(
            EntityId::with_version("p", "person", "ford", Version::At(4)),
            r#"{"name":"Ford","age":42}"#,
        );
        let typed = TypedEntity::<Person>::from_entity(entity.clone()).unwrap();
        assert_eq!(typed.version(), Version::At(4));
        assert_eq!(typed.json, entity.json);
        assert_eq!(typed.into_inner().age, 42);
    }
}
