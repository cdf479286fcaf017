//! Fixture types and sample documents.
//!
//! The sample data follows a small cast of characters so tests read the
//! same across backends.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
}

impl Person {
    /// Creates a person.
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    /// Serializes the person to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("person serializes")
    }
}

/// Ford Prefect, 42.
pub fn ford() -> Person {
    Person::new("Ford", 42)
}

/// Zaphod Beeblebrox, 4200.
pub fn zaphod() -> Person {
    Person::new("Zaphod", 4200)
}

/// Arthur Dent, 30.
pub fn arthur() -> Person {
    Person::new("Arthur", 30)
}

/// A spaceship document with a timestamp property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spaceship {
    /// Ship name.
    pub name: String,
    /// Top speed.
    pub speed: f64,
    /// Commissioning time, RFC 3339.
    pub commissioned: String,
}

impl Spaceship {
    /// Creates a spaceship.
    pub fn new(name: impl Into<String>, speed: f64, commissioned: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            speed,
            commissioned: commissioned.into(),
        }
    }

    /// Serializes the ship to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("spaceship serializes")
    }
}

/// A small fleet with distinct speeds and commissioning times.
pub fn fleet() -> Vec<(&'static str, Spaceship)> {
    vec![
        (
            "heart-of-gold",
            Spaceship::new("Heart of Gold", 1.0e9, "2042-01-01T00:00:00Z"),
        ),
        (
            "vogon-constructor",
            Spaceship::new("Vogon Constructor", 3.5e4, "1979-10-12T00:00:00Z"),
        ),
        (
            "bistromath",
            Spaceship::new("Bistromath", 7.7e7, "1982-01-01T12:30:00Z"),
        ),
    ]
}

/// Returns a project name no other test uses.
pub fn unique_project(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
