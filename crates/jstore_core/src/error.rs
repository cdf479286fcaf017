//! Error types for store operations.

use crate::id::{EntityId, Version};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors shared by every store backend.
///
/// Backends map their native failure signals onto these variants so callers
/// can handle "not found" and "lost a version race" uniformly.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document matched, or the addressed project/document type does not exist.
    #[error("document not found")]
    NotFound,

    /// A version-checked write found a different version than the caller expected.
    #[error("optimistic locking failed for {id}: expected {expected}, found {actual}")]
    OptimisticLocking {
        /// The id (and expected version) the caller supplied.
        id: EntityId,
        /// The version the caller expected.
        expected: Version,
        /// The version currently stored.
        actual: Version,
    },

    /// The query uses an operator or value type the backend cannot evaluate.
    #[error("unsupported query: {message}")]
    UnsupportedQuery {
        /// Description of the unsupported construct.
        message: String,
    },

    /// A query references a property the document does not have.
    #[error("property '{property}' is missing from the document")]
    MissingProperty {
        /// Name of the missing property.
        property: String,
    },

    /// A query references a property whose stored kind does not fit the query value.
    #[error("property '{property}' should be {expected}, found {found}")]
    PropertyType {
        /// Name of the offending property.
        property: String,
        /// Kind required by the query.
        expected: &'static str,
        /// Kind actually stored.
        found: &'static str,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No provider is registered under the requested driver name.
    #[error("no jstore provider for driver: {driver}")]
    NoProvider {
        /// The requested driver name.
        driver: String,
    },

    /// The connection source or a store option could not be applied.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The backend could not be reached.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The backend answered with an error that has no common mapping.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// Backend-specific status code.
        status: u16,
        /// Backend-supplied reason.
        message: String,
    },
}

impl StoreError {
    /// Creates an optimistic locking error.
    pub fn optimistic_locking(id: &EntityId, actual: Version) -> Self {
        Self::OptimisticLocking {
            id: id.clone(),
            expected: id.version,
            actual,
        }
    }

    /// Creates an unsupported query error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedQuery {
            message: message.into(),
        }
    }

    /// Creates a missing property error.
    pub fn missing_property(property: impl Into<String>) -> Self {
        Self::MissingProperty {
            property: property.into(),
        }
    }

    /// Creates a property type error.
    pub fn property_type(
        property: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::PropertyType {
            property: property.into(),
            expected,
            found,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Returns true for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Returns true for [`StoreError::OptimisticLocking`].
    pub fn is_optimistic_locking(&self) -> bool {
        matches!(self, StoreError::OptimisticLocking { .. })
    }
}
