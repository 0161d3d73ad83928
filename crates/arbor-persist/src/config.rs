//! Persistent store configuration

use arbor_store::StoreConfig;
use std::path::PathBuf;

/// Extensions scanned on load, in preference order
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["json", "xml", "ini", "yaml", "native"];

/// Format used by `save` when neither an argument nor recorded metadata names one
pub const DEFAULT_FORMAT: &str = "json";

/// Persistent store configuration
///
/// A `path` ending in `/` (or naming an existing directory) keeps one file per
/// namespace inside that directory; any other path names a single file
/// (extension added on save) holding the whole container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    /// Backing directory or file stem
    pub path: Option<PathBuf>,
    /// Extension allow-list scanned on load
    pub extensions: Vec<String>,
    /// Fallback format for `save`
    pub default_format: String,
    /// Load namespaces transparently on first access
    pub auto: bool,
    /// In-memory store settings
    pub store: StoreConfig,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            path: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
            default_format: DEFAULT_FORMAT.to_owned(),
            auto: true,
            store: StoreConfig::default(),
        }
    }
}

impl PersistConfig {
    /// Create configuration backed by `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// With extension allow-list
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// With fallback save format
    #[inline]
    #[must_use]
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    /// With autoload policy
    #[inline]
    #[must_use]
    pub fn with_auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    /// With in-memory store settings
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

/// Localization settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayConfig {
    /// Locale declared by the application manifest, tried before the default
    pub manifest_locale: Option<String>,
}

impl OverlayConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With manifest locale
    #[inline]
    #[must_use]
    pub fn with_manifest_locale(mut self, locale: impl Into<String>) -> Self {
        self.manifest_locale = Some(locale.into());
        self
    }
}
