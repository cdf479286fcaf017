//! Decode-time typing of document properties.
//!
//! A saved body is decoded once into a [`Document`]: a map from top-level
//! property name to a closed [`PropertyValue`] union. Matching and sorting
//! work over that union instead of re-inspecting raw JSON per query.

use crate::error::{StoreError, StoreResult};
use crate::query::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Typed top-level property of a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// JSON string. Timestamps are strings too and parse on demand.
    Text(String),
    /// JSON number, integer or not, held as `f64`.
    Number(f64),
    /// Any other JSON kind; only its name is kept.
    Other(&'static str),
}

impl PropertyValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => PropertyValue::Text(s.clone()),
            Value::Number(n) => n
                .as_f64()
                .map(PropertyValue::Number)
                .unwrap_or(PropertyValue::Other("number")),
            Value::Bool(_) => PropertyValue::Other("bool"),
            Value::Null => PropertyValue::Other("null"),
            Value::Array(_) => PropertyValue::Other("array"),
            Value::Object(_) => PropertyValue::Other("object"),
        }
    }

    /// Name of the stored kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "string",
            PropertyValue::Number(_) => "number",
            PropertyValue::Other(kind) => kind,
        }
    }

    /// Returns the text, if this is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Parses the text as a timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        self.as_text().and_then(parse_timestamp)
    }
}

/// The typed view of one stored JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    properties: HashMap<String, PropertyValue>,
}

impl Document {
    /// Decodes a JSON body. The body must be a JSON object.
    pub fn parse(json: &str) -> StoreResult<Self> {
        let object: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_object(&object))
    }

    /// Types the properties of an already decoded object.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let properties = object
            .iter()
            .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
            .collect();
        Self { properties }
    }

    /// Looks up a property.
    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.properties.get(property)
    }

    /// Looks up a property that a query requires.
    pub fn require(&self, property: &str) -> StoreResult<&PropertyValue> {
        self.get(property)
            .ok_or_else(|| StoreError::missing_property(property))
    }

    /// Looks up a string property.
    pub fn text(&self, property: &str) -> StoreResult<&str> {
        let value = self.require(property)?;
        value
            .as_text()
            .ok_or_else(|| StoreError::property_type(property, "string", value.kind()))
    }

    /// Looks up a numeric property.
    pub fn number(&self, property: &str) -> StoreResult<f64> {
        let value = self.require(property)?;
        value
            .as_number()
            .ok_or_else(|| StoreError::property_type(property, "number", value.kind()))
    }

    /// Looks up a timestamp property.
    pub fn timestamp(&self, property: &str) -> StoreResult<DateTime<Utc>> {
        let raw = self.text(property)?;
        parse_timestamp(raw)
            .ok_or_else(|| StoreError::property_type(property, "timestamp", "string"))
    }

    /// Number of top-level properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if the object has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn types_properties() {
        let doc = Document::parse(
            r#"{"name":"Ford","age":42,"weight":70.5,"alive":true,"tags":[],"born":"1980-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(doc.len(), 6);
        assert_eq!(doc.text("name").unwrap(), "Ford");
        assert_eq!(doc.number("age").unwrap(), 42.0);
        assert_eq!(doc.number("weight").unwrap(), 70.5);
        assert_eq!(doc.get("alive").unwrap().kind(), "bool");
        assert_eq!(doc.get("tags").unwrap().kind(), "array");
        assert_eq!(
            doc.timestamp("born").unwrap(),
            Utc.with_ymd_and_hms(1980, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_and_mistyped_properties_fail() {
        let doc = Document::parse(r#"{"name":"Ford","age":42}"#).unwrap();
        assert!(matches!(
            doc.number("height"),
            Err(StoreError::MissingProperty { .. })
        ));
        assert!(matches!(
            doc.number("name"),
            Err(StoreError::PropertyType { expected: "number", found: "string", .. })
        ));
        assert!(matches!(
            doc.text("age"),
            Err(StoreError::PropertyType { expected: "string", found: "number", .. })
        ));
        assert!(matches!(
            doc.timestamp("name"),
            Err(StoreError::PropertyType { expected: "timestamp", .. })
        ));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(
            Document::parse("[1,2,3]"),
            Err(StoreError::Serialization(_))
        ));
        assert!(Document::parse("{").is_err());
    }
}
