//! Converters between stored values and file formats
//!
//! Built-in formats:
//! - JSON and YAML via serde
//! - XML and INI with small dedicated codecs
//! - Native binary snapshots via bincode, hex wrapped

use crate::error::ConvertResult;
use crate::meta::ConverterMeta;
use arbor_collection::Value;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;

mod ini;
mod json;
mod native;
mod xml;
mod yaml;

pub use ini::IniConverter;
pub use json::JsonConverter;
pub use native::NativeConverter;
pub use xml::XmlConverter;
pub use yaml::YamlConverter;

/// Two-way codec between a [`Value`] tree and bytes
///
/// Implement this trait to add support for new file formats.
pub trait Converter: Send + Sync + 'static {
    /// Format name used in registries and metadata
    fn format(&self) -> &str;

    /// Supported file extensions (without dot), preferred one first
    fn extensions(&self) -> &[&str];

    /// Encode `value`, consulting and updating `meta`
    ///
    /// # Errors
    /// Returns error if the value has no representation in the format
    fn serialize(&self, value: &Value, meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>>;

    /// Decode `bytes`, recording format details in `meta`
    ///
    /// # Errors
    /// Returns error if the input is malformed
    fn unserialize(&self, bytes: &[u8], meta: &mut ConverterMeta) -> ConvertResult<Value>;

    /// Extension written by this converter
    fn preferred_extension(&self) -> &str {
        self.extensions().first().copied().unwrap_or_else(|| self.format())
    }

    /// Check if this converter can read the given path
    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Hook asked for a converter when a format name is not registered
pub type MissingConverterHook = Arc<dyn Fn(&str) -> Option<Arc<dyn Converter>> + Send + Sync>;

/// Converter registration keyed by format name
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: IndexMap<String, Arc<dyn Converter>>,
    on_missing: Option<MissingConverterHook>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("formats", &self.formats())
            .field("extensions", &self.all_extensions())
            .field("on_missing", &self.on_missing.is_some())
            .finish()
    }
}

impl ConverterRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, replacing any converter of the same format
    pub fn register<C: Converter>(&mut self, converter: C) {
        self.register_arc(Arc::new(converter));
    }

    pub fn register_arc(&mut self, converter: Arc<dyn Converter>) {
        let format = converter.format().to_owned();
        tracing::debug!(%format, "registering converter");
        self.converters.insert(format, converter);
    }

    /// Install the hook consulted by [`resolve`](Self::resolve)
    pub fn set_missing_hook(&mut self, hook: MissingConverterHook) {
        self.on_missing = Some(hook);
    }

    /// Builder variant of [`set_missing_hook`](Self::set_missing_hook)
    #[must_use]
    pub fn with_missing_hook(
        mut self,
        hook: impl Fn(&str) -> Option<Arc<dyn Converter>> + Send + Sync + 'static,
    ) -> Self {
        self.on_missing = Some(Arc::new(hook));
        self
    }

    /// Registered converter for `format`
    #[must_use]
    pub fn get(&self, format: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(format).cloned()
    }

    /// Converter for `format`, asking the missing hook when unregistered
    ///
    /// A converter supplied by the hook is registered for later lookups.
    pub fn resolve(&mut self, format: &str) -> Option<Arc<dyn Converter>> {
        if let Some(found) = self.get(format) {
            return Some(found);
        }
        let supplied = self.on_missing.as_ref().and_then(|hook| hook(format))?;
        tracing::debug!(%format, "converter supplied by missing hook");
        self.converters.insert(format.to_owned(), Arc::clone(&supplied));
        Some(supplied)
    }

    /// Converter reading files with extension `ext`
    #[must_use]
    pub fn for_extension(&self, ext: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .values()
            .find(|c| c.extensions().contains(&ext))
            .cloned()
    }

    /// Converter able to read `path`
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<Arc<dyn Converter>> {
        self.converters.values().find(|c| c.can_read(path)).cloned()
    }

    /// Registered format names in registration order
    #[must_use]
    pub fn formats(&self) -> Vec<&str> {
        self.converters.keys().map(String::as_str).collect()
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.converters
            .values()
            .flat_map(|c| c.extensions())
            .copied()
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, format: &str) -> bool {
        self.converters.contains_key(format)
    }
}

/// Create registry with every built-in converter
#[must_use]
pub fn default_converters() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    registry.register(JsonConverter);
    registry.register(XmlConverter);
    registry.register(IniConverter);
    registry.register(YamlConverter);
    registry.register(NativeConverter);
    registry
}
