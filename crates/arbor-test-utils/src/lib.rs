//! Testing utilities for Arbor workspace
//!
//! Shared temp-directory fixtures and sample documents.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use arbor_collection::Value;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory removed on drop, with helpers addressed by relative path
#[derive(Debug)]
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Base path with a trailing separator, selecting one file per namespace
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(format!("{}/", self.dir.path().display()))
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).unwrap()
    }

    /// Parse a JSON file
    pub fn read_json(&self, relative: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }

    /// Names of the regular files directly inside `relative`, sorted
    pub fn files(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.join(relative))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Nested settings document with every scalar kind
pub fn sample_settings() -> Value {
    Value::from(json!({
        "server": {
            "host": "localhost",
            "port": 8080,
            "tls": false,
            "aliases": ["www", "api"]
        },
        "ratio": 0.75,
        "owner": null
    }))
}

/// Flat translation table with a placeholder
pub fn sample_messages() -> Value {
    Value::from(json!({
        "greeting": "Hello, {name}!",
        "farewell": "Goodbye"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_tree_helpers() {
        let tree = TempTree::new();
        tree.write("a/b.json", "{}");
        tree.write("c.txt", "x");
        assert!(tree.exists("a/b.json"));
        assert_eq!(tree.files(""), vec!["c.txt".to_owned()]);
        assert_eq!(tree.read_json("a/b.json"), json!({}));
        assert!(tree.dir_path().to_string_lossy().ends_with('/'));
    }
}
