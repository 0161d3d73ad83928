//! File-backed nested store
//!
//! [`PersistentStore`] keeps a [`NestedStore`] in memory and maps namespaces
//! to files. `load`, `save` and `remove` never return errors: failures are
//! logged, kept as [`PersistentStore::last_error`], and reported through the
//! returned `bool`.

use crate::config::PersistConfig;
use crate::error::{StoreError, StoreResult};
use arbor_collection::Value;
use arbor_convert::{default_converters, Converter, ConverterMeta, ConverterRegistry};
use arbor_path::ParsedIndex;
use arbor_store::{NestedStore, PathStore};
use std::collections::HashMap;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-namespace persistence state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceState {
    /// Metadata recorded by the last load or save
    pub meta: Option<ConverterMeta>,
    /// File the namespace was last read from or written to
    pub source: Option<PathBuf>,
    /// Whether a load was attempted
    pub loaded: bool,
}

/// How namespaces map to files
#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// `<dir>/<namespace>.<ext>`
    Directory(PathBuf),
    /// `<dir>/<name>.<ext>` holding the whole container
    File { dir: PathBuf, name: String },
}

impl Layout {
    fn from_path(path: &Path) -> Self {
        let text = path.to_string_lossy();
        if text.ends_with('/') || text.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
            return Self::Directory(path.to_path_buf());
        }
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::File { dir, name }
    }

    fn dir(&self) -> &Path {
        match self {
            Self::Directory(dir) | Self::File { dir, .. } => dir,
        }
    }
}

/// Where a namespace lives, in memory and on disk
struct Slot {
    /// State key (`""` for single-file stores)
    key: String,
    /// Namespace in the container (`None` for the whole container)
    target: Option<String>,
    /// File name without extension
    name: String,
}

/// Nested store backed by files
#[derive(Debug)]
pub struct PersistentStore {
    store: NestedStore,
    config: PersistConfig,
    registry: ConverterRegistry,
    layout: Layout,
    states: HashMap<String, NamespaceState>,
    lookup_dir: Option<PathBuf>,
    last_error: Option<StoreError>,
}

impl PersistentStore {
    /// Create store with the built-in converters
    ///
    /// # Errors
    /// Returns `MissingPath` without a backing path, `InvalidConfig` if the
    /// in-memory store settings are rejected
    pub fn new(config: PersistConfig) -> StoreResult<Self> {
        Self::with_registry(config, default_converters())
    }

    /// Create store with a custom converter registry
    ///
    /// # Errors
    /// Same as [`new`](Self::new)
    pub fn with_registry(config: PersistConfig, registry: ConverterRegistry) -> StoreResult<Self> {
        let path = config
            .path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(StoreError::MissingPath)?;
        let layout = Layout::from_path(path);
        let store = NestedStore::with_config(config.store.clone())?;
        tracing::debug!(path = %path.display(), directory = matches!(layout, Layout::Directory(_)), "persistent store opened");

        Ok(Self {
            store,
            config,
            registry,
            layout,
            states: HashMap::new(),
            lookup_dir: None,
            last_error: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Directory holding the backing files
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.layout.dir()
    }

    /// Whether each namespace has its own file
    #[inline]
    #[must_use]
    pub fn is_directory_store(&self) -> bool {
        matches!(self.layout, Layout::Directory(_))
    }

    pub fn set_auto(&mut self, auto: bool) {
        self.config.auto = auto;
    }

    /// Failure of the most recent `load`, `save` or `remove`
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Take ownership of the last failure, clearing it
    pub fn take_error(&mut self) -> Option<StoreError> {
        self.last_error.take()
    }

    /// Recorded metadata for a namespace
    #[must_use]
    pub fn meta(&self, namespace: Option<&str>) -> Option<&ConverterMeta> {
        let slot = self.slot(namespace).ok()?;
        self.states.get(&slot.key)?.meta.as_ref()
    }

    #[must_use]
    pub fn is_loaded(&self, namespace: Option<&str>) -> bool {
        self.slot(namespace)
            .ok()
            .and_then(|slot| self.states.get(&slot.key))
            .is_some_and(|state| state.loaded)
    }

    /// Namespaces with a completed load, sorted
    #[must_use]
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .states
            .iter()
            .filter(|(key, state)| state.loaded && !key.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        names.sort();
        names
    }

    /// Drop all in-memory data, recorded metadata and cached resolutions
    pub fn reset(&mut self) {
        tracing::debug!(directory = %self.layout.dir().display(), "persistent store reset");
        self.store.reset();
        self.states.clear();
    }

    /// Redirect file lookups into `dir` until the guard is dropped
    ///
    /// Lookups that find nothing in `dir` fall back to the base directory.
    /// Saves write into `dir`.
    pub fn redirect(&mut self, dir: impl Into<PathBuf>) -> DirectoryGuard<'_> {
        let previous = self.lookup_dir.replace(dir.into());
        DirectoryGuard {
            store: self,
            previous,
        }
    }

    /// Backing file for a namespace, if one exists
    #[must_use]
    pub fn search_file(&self, namespace: Option<&str>) -> Option<PathBuf> {
        let slot = self.slot(namespace).ok()?;
        self.find_file(&slot.name).map(|(path, _)| path)
    }

    /// Read the namespace file into memory
    ///
    /// A missing file leaves the namespace empty but loaded.
    pub fn load(&mut self, namespace: Option<&str>) -> bool {
        self.last_error = None;
        let result = self.try_load(namespace);
        self.settle("load", namespace, result)
    }

    /// Write the namespace to disk
    ///
    /// The format is `format`, else the recorded one, else the configured
    /// default. A file left from a previous format is deleted once the new
    /// one is written.
    pub fn save(&mut self, namespace: Option<&str>, format: Option<&str>) -> bool {
        self.last_error = None;
        let result = self.try_save(namespace, format);
        self.settle("save", namespace, result)
    }

    /// Delete the namespace file and drop the namespace from memory
    pub fn remove(&mut self, namespace: Option<&str>) -> bool {
        self.last_error = None;
        let result = self.try_remove(namespace);
        self.settle("remove", namespace, result)
    }

    /// Load the namespace of `index` if autoload is on and it was never loaded
    pub fn autoload(&mut self, index: &ParsedIndex) {
        if !self.config.auto {
            return;
        }
        let namespace = match self.layout {
            Layout::Directory(_) => match index.namespace.as_deref() {
                Some(ns) => Some(ns),
                None => return,
            },
            Layout::File { .. } => None,
        };
        if !self.is_loaded(namespace) {
            self.load(namespace);
        }
    }

    fn settle(&mut self, operation: &str, namespace: Option<&str>, result: StoreResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(operation, namespace = namespace.unwrap_or_default(), %error, "persistent store operation failed");
                self.last_error = Some(error);
                false
            }
        }
    }

    fn slot(&self, namespace: Option<&str>) -> StoreResult<Slot> {
        match &self.layout {
            Layout::Directory(_) => {
                let ns = namespace.unwrap_or_default();
                if ns.is_empty()
                    || ns == "."
                    || ns == ".."
                    || ns.contains(['/', '\\'])
                    || ns.contains("..")
                {
                    return Err(StoreError::InvalidNamespace(ns.to_owned()));
                }
                Ok(Slot {
                    key: ns.to_owned(),
                    target: Some(ns.to_owned()),
                    name: ns.to_owned(),
                })
            }
            Layout::File { name, .. } => Ok(Slot {
                key: String::new(),
                target: None,
                name: name.clone(),
            }),
        }
    }

    /// Directory saves write into
    fn write_dir(&self) -> PathBuf {
        self.lookup_dir
            .clone()
            .unwrap_or_else(|| self.layout.dir().to_path_buf())
    }

    fn find_in(&self, dir: &Path, name: &str) -> Option<(PathBuf, Arc<dyn Converter>)> {
        self.config.extensions.iter().find_map(|ext| {
            let path = dir.join(format!("{name}.{ext}"));
            if !path.is_file() {
                return None;
            }
            match self.registry.for_extension(ext) {
                Some(converter) => Some((path, converter)),
                None => {
                    tracing::debug!(path = %path.display(), "no converter for allowed extension");
                    None
                }
            }
        })
    }

    /// First readable file for `name`, redirected directory first
    fn find_file(&self, name: &str) -> Option<(PathBuf, Arc<dyn Converter>)> {
        self.lookup_dir
            .as_deref()
            .and_then(|dir| self.find_in(dir, name))
            .or_else(|| self.find_in(self.layout.dir(), name))
    }

    fn try_load(&mut self, namespace: Option<&str>) -> StoreResult<()> {
        let slot = self.slot(namespace)?;
        // Marked before reading so a failing file is not retried on every access
        let state = self.states.entry(slot.key.clone()).or_default();
        state.loaded = true;

        let Some((path, converter)) = self.find_file(&slot.name) else {
            tracing::debug!(namespace = %slot.key, "no backing file, namespace starts empty");
            return Ok(());
        };

        let bytes = fs::read(&path).map_err(|e| StoreError::read(&path, e))?;
        let mut meta = ConverterMeta::new(converter.format());
        let value = converter
            .unserialize(&bytes, &mut meta)
            .map_err(|e| StoreError::convert(&path, e))?;
        tracing::debug!(namespace = %slot.key, path = %path.display(), format = %meta.format, "namespace loaded");

        self.store.replace_namespace(slot.target.as_deref(), value);
        self.states.insert(
            slot.key,
            NamespaceState {
                meta: Some(meta),
                source: Some(path),
                loaded: true,
            },
        );
        Ok(())
    }

    fn try_save(&mut self, namespace: Option<&str>, format: Option<&str>) -> StoreResult<()> {
        let slot = self.slot(namespace)?;
        if self.config.auto && !self.is_loaded(namespace) {
            self.try_load(namespace)?;
        }

        let state = self.states.get(&slot.key).cloned().unwrap_or_default();
        let format = format
            .map(str::to_owned)
            .or_else(|| state.meta.as_ref().map(|m| m.format.clone()))
            .unwrap_or_else(|| self.config.default_format.clone());
        let converter = self
            .registry
            .resolve(&format)
            .ok_or_else(|| StoreError::UnknownFormat(format.clone()))?;

        let dir = self.write_dir();
        let path = dir.join(format!("{}.{}", slot.name, converter.preferred_extension()));
        let mut meta = state
            .meta
            .filter(|m| m.format == converter.format())
            .unwrap_or_else(|| ConverterMeta::new(converter.format()));
        // Formats with a named root element use the namespace
        if meta.root().is_none() {
            if let Some(ns) = slot.target.as_deref() {
                meta = meta.with_root(ns);
            }
        }
        let value = self
            .store
            .namespace_value(slot.target.as_deref())
            .cloned()
            .unwrap_or_else(Value::map);
        let bytes = converter
            .serialize(&value, &mut meta)
            .map_err(|e| StoreError::convert(&path, e))?;

        fs::create_dir_all(&dir).map_err(|e| StoreError::write(&dir, e))?;
        fs::write(&path, bytes).map_err(|e| StoreError::write(&path, e))?;
        tracing::debug!(namespace = %slot.key, path = %path.display(), %format, "namespace saved");

        let mut stale: Vec<PathBuf> = self
            .config
            .extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{ext}", slot.name)))
            .collect();
        stale.extend(state.source.filter(|old| old.parent() == path.parent()));
        stale.retain(|old| *old != path);
        self.states.insert(
            slot.key,
            NamespaceState {
                meta: Some(meta),
                source: Some(path),
                loaded: true,
            },
        );

        for old in stale.iter().filter(|old| old.is_file()) {
            fs::remove_file(old).map_err(|e| StoreError::clean(old, e))?;
            tracing::debug!(path = %old.display(), "stale file removed");
        }
        Ok(())
    }

    fn try_remove(&mut self, namespace: Option<&str>) -> StoreResult<()> {
        let slot = self.slot(namespace)?;
        let recorded = self.states.remove(&slot.key).and_then(|state| state.source);
        let path = recorded.or_else(|| {
            self.find_in(&self.write_dir(), &slot.name)
                .map(|(path, _)| path)
        });
        self.store.drop_namespace(slot.target.as_deref());

        if let Some(path) = path.filter(|p| p.exists()) {
            fs::remove_file(&path).map_err(|e| StoreError::destroy(&path, e))?;
            tracing::debug!(namespace = %slot.key, path = %path.display(), "namespace file removed");
        }
        Ok(())
    }
}

impl PathStore for PersistentStore {
    #[inline]
    fn nested(&self) -> &NestedStore {
        &self.store
    }

    #[inline]
    fn nested_mut(&mut self) -> &mut NestedStore {
        &mut self.store
    }

    fn prepare(&mut self, index: &ParsedIndex) {
        self.autoload(index);
    }
}

/// Scoped lookup redirection, restored on drop
#[derive(Debug)]
pub struct DirectoryGuard<'a> {
    store: &'a mut PersistentStore,
    previous: Option<PathBuf>,
}

impl Deref for DirectoryGuard<'_> {
    type Target = PersistentStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl DerefMut for DirectoryGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store
    }
}

impl Drop for DirectoryGuard<'_> {
    fn drop(&mut self) {
        self.store.lookup_dir = self.previous.take();
    }
}
