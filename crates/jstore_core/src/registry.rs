//! Driver-name to backend-factory registry.

use crate::bucket::Bucket;
use crate::error::{StoreError, StoreResult};
use crate::marshal::JStore;
use crate::query::StoreOption;
use crate::store::Store;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Factory building a backend from a connection source and options.
pub type ProviderFn =
    dyn Fn(&str, &[StoreOption]) -> StoreResult<Box<dyn Store>> + Send + Sync + 'static;

/// Maps driver names to backend factories.
///
/// Construct one registry at startup, let each backend crate register its
/// provider, and pass the registry to whatever resolves driver names.
/// Registering a name twice replaces the earlier factory.
///
/// ```
/// use jstore_core::{Registry, StoreError};
///
/// let registry = Registry::new();
/// let err = registry.new_store("nope", "", &[]).unwrap_err();
/// assert!(matches!(err, StoreError::NoProvider { .. }));
/// ```
#[derive(Default)]
pub struct Registry {
    providers: RwLock<HashMap<String, Arc<ProviderFn>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any earlier registration.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str, &[StoreOption]) -> StoreResult<Box<dyn Store>> + Send + Sync + 'static,
    {
        let name = name.into();
        info!(driver = %name, "registering jstore provider");
        self.providers.write().insert(name, Arc::new(factory));
    }

    /// Returns true if a provider is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.read().contains_key(name)
    }

    /// Returns the registered driver names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds a store through the provider registered as `driver`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoProvider`] if nothing is registered under
    /// `driver`, or whatever the factory fails with.
    pub fn new_store(
        &self,
        driver: &str,
        connection_source: &str,
        options: &[StoreOption],
    ) -> StoreResult<JStore> {
        // The factory runs outside the lock so it may consult the registry itself.
        let factory = self
            .providers
            .read()
            .get(driver)
            .cloned()
            .ok_or_else(|| StoreError::NoProvider {
                driver: driver.to_string(),
            })?;
        debug!(driver, "constructing store");
        let store = factory(connection_source, options)?;
        Ok(JStore::wrap(store))
    }

    /// Builds a store and scopes it to one collection.
    pub fn new_bucket(
        &self,
        driver: &str,
        connection_source: &str,
        project: &str,
        document_type: &str,
        options: &[StoreOption],
    ) -> StoreResult<Bucket> {
        Ok(self
            .new_store(driver, connection_source, options)?
            .bucket(project, document_type))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.provider_names())
            .finish()
    }
}
