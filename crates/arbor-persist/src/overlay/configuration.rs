//! Environment-aware configuration store

use crate::config::PersistConfig;
use crate::error::{StoreError, StoreResult};
use crate::overlay::{OverlayContext, OverlayStore};
use crate::store::PersistentStore;
use arbor_path::ParsedIndex;
use arbor_store::{NestedStore, PathStore};

/// Configuration files with per-environment overrides
///
/// Candidates, in order: the environment requested on this store, the one
/// active in the shared context, and the base directory.
///
/// ```rust,no_run
/// use arbor_persist::{Configuration, OverlayContext, PersistConfig};
/// use arbor_store::PathStore;
///
/// let context = OverlayContext::new();
/// context.set_environment("production");
///
/// let mut config = Configuration::new(PersistConfig::new("config/"), context)?;
/// let port = config.get_integer("server:port").unwrap_or(8080);
/// # Ok::<(), arbor_persist::StoreError>(())
/// ```
#[derive(Debug)]
pub struct Configuration {
    inner: OverlayStore,
    requested: Option<String>,
}

impl Configuration {
    /// Create configuration store over `config.path`
    ///
    /// # Errors
    /// Same as [`PersistentStore::new`]
    pub fn new(config: PersistConfig, context: OverlayContext) -> StoreResult<Self> {
        Ok(Self::from_store(PersistentStore::new(config)?, context))
    }

    #[must_use]
    pub fn from_store(store: PersistentStore, context: OverlayContext) -> Self {
        Self {
            inner: OverlayStore::new(store, context),
            requested: None,
        }
    }

    /// Prefer `name` over the context environment (`None` to follow the context)
    pub fn request_environment(&mut self, name: Option<&str>) {
        self.requested = name.map(str::to_owned);
    }

    /// Resolve the active environment, clearing stale data on a change
    ///
    /// Returns the chosen name, `""` for the base directory.
    pub fn select(&mut self) -> String {
        let requested = self.requested.clone().unwrap_or_default();
        let shared = self.inner.context().environment();
        self.inner.select([requested.as_str(), shared.as_str(), ""])
    }

    /// Active environment after re-selection
    pub fn environment(&mut self) -> String {
        self.select()
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &OverlayContext {
        self.inner.context()
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &PersistentStore {
        self.inner.store()
    }

    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&StoreError> {
        self.inner.store().last_error()
    }

    pub fn load(&mut self, namespace: &str) -> bool {
        self.select();
        self.inner.scoped(|store| store.load(Some(namespace)))
    }

    /// Save into the active environment directory
    pub fn save(&mut self, namespace: &str, format: Option<&str>) -> bool {
        self.select();
        self.inner.scoped(|store| store.save(Some(namespace), format))
    }

    pub fn remove(&mut self, namespace: &str) -> bool {
        self.select();
        self.inner.scoped(|store| store.remove(Some(namespace)))
    }
}

impl PathStore for Configuration {
    #[inline]
    fn nested(&self) -> &NestedStore {
        self.inner.store().nested()
    }

    #[inline]
    fn nested_mut(&mut self) -> &mut NestedStore {
        self.inner.store_mut().nested_mut()
    }

    fn prepare(&mut self, index: &ParsedIndex) {
        self.select();
        self.inner.scoped(|store| store.autoload(index));
    }
}
