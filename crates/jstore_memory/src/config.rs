//! In-memory store configuration.

use jstore_core::{StoreError, StoreOption, StoreResult};

/// Configuration for a [`crate::MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Number of projects to reserve room for up front.
    pub initial_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
        }
    }
}

impl MemoryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial project capacity.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builds a configuration from a provider's connection source and options.
    ///
    /// The connection source is ignored. Writes are always visible
    /// immediately, so [`StoreOption::SyncUpdates`] and
    /// [`StoreOption::Timeout`] are accepted and have no effect.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for an unknown `Param` key or an
    /// `initial_capacity` that is not a number.
    pub fn from_source(_connection_source: &str, options: &[StoreOption]) -> StoreResult<Self> {
        let mut config = Self::new();
        for option in options {
            match option {
                StoreOption::Param { key, value } if key == "initial_capacity" => {
                    let capacity = value.parse().map_err(|_| {
                        StoreError::invalid_config(format!(
                            "initial_capacity must be a number, got '{value}'"
                        ))
                    })?;
                    config = config.initial_capacity(capacity);
                }
                StoreOption::Param { key, .. } => {
                    return Err(StoreError::invalid_config(format!(
                        "unknown memory store parameter '{key}'"
                    )));
                }
                _ => {}
            }
        }
        Ok(config)
    }
}
