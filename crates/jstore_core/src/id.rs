//! Document identity and version tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version token used for optimistic concurrency.
///
/// `Unversioned` is the "don't check" sentinel: a write carrying it is
/// accepted whatever version is currently stored. It is never the same
/// thing as a real version; the first successful write yields `At(1)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Version {
    /// No version constraint.
    #[default]
    Unversioned,
    /// A concrete stored version, starting at 1.
    At(u64),
}

impl Version {
    /// Returns the version a successful write over `self` produces.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Version::Unversioned => Version::At(1),
            Version::At(n) => Version::At(n + 1),
        }
    }

    /// Returns true if a write expecting `self` may replace `current`.
    #[must_use]
    pub fn matches(self, current: Version) -> bool {
        match self {
            Version::Unversioned => true,
            expected => expected == current,
        }
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub const fn is_unversioned(self) -> bool {
        matches!(self, Version::Unversioned)
    }

    /// Returns the raw counter, if any.
    #[must_use]
    pub const fn as_u64(self) -> Option<u64> {
        match self {
            Version::Unversioned => None,
            Version::At(n) => Some(n),
        }
    }
}

impl From<u64> for Version {
    fn from(n: u64) -> Self {
        Version::At(n)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Unversioned => f.write_str("none"),
            Version::At(n) => write!(f, "{n}"),
        }
    }
}

/// Identifies a stored document.
///
/// `project` and `document_type` select a collection (a bucket), `id` is
/// unique within it, and `version` is the optimistic-concurrency token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    /// Top-level namespace.
    pub project: String,
    /// Collection within the project.
    pub document_type: String,
    /// Document id, unique within the collection.
    pub id: String,
    /// Version the caller expects, or the version a store returned.
    pub version: Version,
}

impl EntityId {
    /// Creates an unversioned id.
    pub fn new(
        project: impl Into<String>,
        document_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::with_version(project, document_type, id, Version::Unversioned)
    }

    /// Creates an id carrying `version`.
    pub fn with_version(
        project: impl Into<String>,
        document_type: impl Into<String>,
        id: impl Into<String>,
        version: Version,
    ) -> Self {
        Self {
            project: project.into(),
            document_type: document_type.into(),
            id: id.into(),
            version,
        }
    }

    /// Returns a copy of this id carrying `version`.
    #[must_use]
    pub fn at(&self, version: Version) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// Returns a copy of this id moved into another collection.
    #[must_use]
    pub fn scoped(&self, project: &str, document_type: &str) -> Self {
        Self {
            project: project.to_string(),
            document_type: document_type.to_string(),
            id: self.id.clone(),
            version: self.version,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.project, self.document_type, self.id, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_starts_at_one() {
        assert_eq!(Version::Unversioned.next(), Version::At(1));
        assert_eq!(Version::At(1).next(), Version::At(2));
    }

    #[test]
    fn sentinel_matches_anything() {
        assert!(Version::Unversioned.matches(Version::At(7)));
        assert!(Version::Unversioned.matches(Version::Unversioned));
        assert!(Version::At(7).matches(Version::At(7)));
        assert!(!Version::At(6).matches(Version::At(7)));
    }

    #[test]
    fn sentinel_is_not_zero() {
        assert_ne!(Version::Unversioned, Version::At(0));
        assert_eq!(Version::Unversioned.as_u64(), None);
        assert_eq!(Version::At(0).as_u64(), Some(0));
    }

    #[test]
    fn scoped_keeps_id_and_version() {
        let id = EntityId::with_version("a", "b", "x", Version::At(3));
        let moved = id.scoped("p", "t");
        assert_eq!(moved, EntityId::with_version("p", "t", "x", Version::At(3)));
    }

    #[test]
    fn display() {
        let id = EntityId::new("p", "person", "ford");
        assert_eq!(id.to_string(), "p/person/ford@none");
        assert_eq!(id.at(Version::At(2)).to_string(), "p/person/ford@2");
    }
}
