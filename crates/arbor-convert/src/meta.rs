//! Converter metadata side channel
//!
//! Unserializing records format details (XML root element, attribute paths,
//! INI sections) in a [`ConverterMeta`]; serializing the same namespace
//! again consults it to reproduce the original layout.

use arbor_collection::{Map, Value};

/// Key holding the XML root element name
pub const ROOT_KEY: &str = "root";

/// Per-namespace format metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConverterMeta {
    /// Format name of the converter that produced or will consume the data
    pub format: String,
    /// Converter specific details
    pub extra: Map,
}

impl ConverterMeta {
    /// Create metadata for `format` with no extra details
    #[inline]
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            extra: Map::new(),
        }
    }

    /// Builder: set the XML root element name
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.set(ROOT_KEY, Value::String(root.into()));
        self
    }

    /// Root element name, if recorded
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.get_str(ROOT_KEY)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    /// List of strings stored under `key` (non-strings are skipped)
    #[must_use]
    pub fn paths(&self, key: &str) -> Vec<String> {
        self.extra
            .get(key)
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Store a list of strings under `key`, removing the key when empty
    pub fn set_paths(&mut self, key: &str, paths: Vec<String>) {
        if paths.is_empty() {
            self.extra.shift_remove(key);
        } else {
            let list = paths.into_iter().map(Value::String).collect();
            self.extra.insert(key.to_owned(), Value::List(list));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_builder() {
        let meta = ConverterMeta::new("xml").with_root("config");
        assert_eq!(meta.root(), Some("config"));
        assert_eq!(meta.format, "xml");
    }

    #[test]
    fn path_lists() {
        let mut meta = ConverterMeta::new("xml");
        meta.set_paths("attributes", vec!["a.id".into(), "b".into()]);
        assert_eq!(meta.paths("attributes"), vec!["a.id", "b"]);

        meta.set_paths("attributes", Vec::new());
        assert!(meta.get("attributes").is_none());
        assert!(meta.paths("missing").is_empty());
    }
}
