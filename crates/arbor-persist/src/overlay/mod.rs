//! Environment and locale overlays
//!
//! An overlay is a subdirectory of the store directory holding files that
//! take precedence over the base ones:
//!
//! ```text
//! config/
//! ├── app.json          # default
//! ├── production/
//! │   └── app.json      # used when "production" is selected
//! └── staging/          # valid overlay; falls back to config/app.json
//! ```
//!
//! [`Overlay`] picks the first existing candidate; [`OverlayStore`] clears
//! everything loaded from the previous overlay when the choice changes and
//! runs file operations with lookups redirected into the chosen directory.

use crate::store::PersistentStore;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod configuration;
mod localization;

pub use configuration::Configuration;
pub use localization::Localization;

#[derive(Debug, Default)]
struct ActiveOverlays {
    environment: String,
    locale: String,
}

/// Shared handle to the active environment and locale
///
/// Clones share state, so one context can drive several stores. Empty names
/// mean "not set".
#[derive(Debug, Clone, Default)]
pub struct OverlayContext {
    inner: Arc<RwLock<ActiveOverlays>>,
}

impl OverlayContext {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn environment(&self) -> String {
        self.inner.read().environment.clone()
    }

    #[must_use]
    pub fn locale(&self) -> String {
        self.inner.read().locale.clone()
    }

    pub fn set_environment(&self, name: impl Into<String>) {
        self.inner.write().environment = name.into();
    }

    pub fn set_locale(&self, name: impl Into<String>) {
        self.inner.write().locale = name.into();
    }
}

/// Overlay directory resolver
///
/// The empty name is the base directory itself and is always valid. Names
/// found to exist are remembered and never checked again.
#[derive(Debug, Clone)]
pub struct Overlay {
    base: PathBuf,
    valid: HashSet<String>,
    active: Option<String>,
}

impl Overlay {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            valid: HashSet::new(),
            active: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Currently selected overlay name
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether `name` is the base or an existing subdirectory of it
    pub fn is_valid(&mut self, name: &str) -> bool {
        if name.is_empty() || self.valid.contains(name) {
            return true;
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return false;
        }
        let exists = self.base.join(name).is_dir();
        if exists {
            self.valid.insert(name.to_owned());
        }
        exists
    }

    /// First valid candidate, or the base when none is
    pub fn pick<'a>(&mut self, candidates: impl IntoIterator<Item = &'a str>) -> String {
        candidates
            .into_iter()
            .find(|name| self.is_valid(name))
            .unwrap_or_default()
            .to_owned()
    }

    /// Make `name` active; returns `true` when data read so far may be stale
    ///
    /// The first activation counts as a switch unless it picks the base,
    /// since anything loaded before it came from the base directory.
    pub fn activate(&mut self, name: &str) -> bool {
        match self.active.as_deref() {
            Some(current) if current == name => false,
            previous => {
                let switched = previous.is_some() || !name.is_empty();
                self.active = Some(name.to_owned());
                switched
            }
        }
    }

    /// Directory lookups are redirected to, `None` for the base
    #[must_use]
    pub fn directory(&self) -> Option<PathBuf> {
        self.active
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| self.base.join(name))
    }
}

/// Persistent store whose file lookups go through an [`Overlay`]
#[derive(Debug)]
pub struct OverlayStore {
    store: PersistentStore,
    overlay: Overlay,
    context: OverlayContext,
}

impl OverlayStore {
    #[must_use]
    pub fn new(store: PersistentStore, context: OverlayContext) -> Self {
        let overlay = Overlay::new(store.directory());
        Self {
            store,
            overlay,
            context,
        }
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &OverlayContext {
        &self.context
    }

    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut PersistentStore {
        &mut self.store
    }

    /// Select the first valid candidate, dropping stale state on a switch
    pub fn select<'a>(&mut self, candidates: impl IntoIterator<Item = &'a str>) -> String {
        let chosen = self.overlay.pick(candidates);
        if self.overlay.activate(&chosen) {
            tracing::debug!(overlay = %chosen, "overlay switched, clearing loaded state");
            self.store.reset();
        }
        chosen
    }

    /// Run `f` with file lookups redirected into the active overlay
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut PersistentStore) -> R) -> R {
        match self.overlay.directory() {
            Some(dir) => {
                let mut guard = self.store.redirect(dir);
                f(&mut *guard)
            }
            None => f(&mut self.store),
        }
    }
}
