//! Store configuration

use arbor_collection::Shape;
use arbor_path::DEFAULT_KEY_SEPARATOR;

/// Search cache policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Never cache resolutions
    None,
    /// Cache resolutions by value (container path + key)
    #[default]
    Simple,
}

/// Nested store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Namespace used by addresses without an explicit `ns:` prefix
    pub namespace: Option<String>,
    /// Separator between key segments
    pub separator: char,
    /// Search cache policy
    pub cache: CacheMode,
    /// Shape of containers created by auto-vivification
    pub shape: Shape,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// With key separator
    #[inline]
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// With cache policy
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    /// With vivification shape
    #[inline]
    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            separator: DEFAULT_KEY_SEPARATOR,
            cache: CacheMode::Simple,
            shape: Shape::Map,
        }
    }
}
