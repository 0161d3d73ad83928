//! Memoizing path index
//!
//! Provides [`PathIndex`], which parses addresses once per raw string. The
//! memo embeds the default namespace and separator in force at parse time, so
//! changing either clears it wholesale.

use crate::address::{ParsedIndex, DEFAULT_KEY_SEPARATOR, NAMESPACE_SEPARATOR, TYPE_SEPARATOR};
use std::collections::HashMap;
use std::sync::Arc;

/// Errors related to path index configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Key separator collides with the address grammar
    #[error("invalid key separator {0:?}: ':' and '!' are reserved")]
    ReservedSeparator(char),

    /// Namespace name contains a reserved character
    #[error("invalid namespace {0:?}: must be non-empty and free of ':' and '!'")]
    InvalidNamespace(String),
}

/// Address parser with a per-instance memo
#[derive(Debug, Clone)]
pub struct PathIndex {
    namespace: Option<String>,
    separator: char,
    memo: HashMap<String, Arc<ParsedIndex>>,
}

impl Default for PathIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PathIndex {
    /// Index without default namespace, `.` between segments
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: None,
            separator: DEFAULT_KEY_SEPARATOR,
            memo: HashMap::new(),
        }
    }

    /// Index with a default namespace and separator
    ///
    /// # Errors
    /// Returns error if the namespace or separator is reserved
    pub fn with(namespace: Option<&str>, separator: char) -> Result<Self, PathError> {
        let mut index = Self::new();
        index.set_separator(separator)?;
        index.set_namespace(namespace)?;
        Ok(index)
    }

    /// Parse `address`, reusing a previous parse of the same string
    pub fn parse(&mut self, address: &str) -> Arc<ParsedIndex> {
        if let Some(parsed) = self.memo.get(address) {
            return Arc::clone(parsed);
        }
        let parsed = Arc::new(ParsedIndex::parse(
            address,
            self.namespace.as_deref(),
            self.separator,
        ));
        self.memo.insert(address.to_owned(), Arc::clone(&parsed));
        parsed
    }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Number of memoized addresses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Change the default namespace; clears the memo when it differs
    ///
    /// # Errors
    /// Returns error if the name is empty or contains `:` or `!`
    pub fn set_namespace(&mut self, namespace: Option<&str>) -> Result<(), PathError> {
        if let Some(ns) = namespace {
            if ns.is_empty() || ns.contains([NAMESPACE_SEPARATOR, TYPE_SEPARATOR]) {
                return Err(PathError::InvalidNamespace(ns.to_owned()));
            }
        }
        if self.namespace.as_deref() != namespace {
            self.namespace = namespace.map(str::to_owned);
            self.clear();
        }
        Ok(())
    }

    /// Change the key separator; clears the memo when it differs
    ///
    /// # Errors
    /// Returns error if the separator is `:` or `!`
    pub fn set_separator(&mut self, separator: char) -> Result<(), PathError> {
        if separator == NAMESPACE_SEPARATOR || separator == TYPE_SEPARATOR {
            return Err(PathError::ReservedSeparator(separator));
        }
        if self.separator != separator {
            self.separator = separator;
            self.clear();
        }
        Ok(())
    }

    /// Drop every memoized parse
    pub fn clear(&mut self) {
        if !self.memo.is_empty() {
            tracing::trace!(entries = self.memo.len(), "clearing path index");
        }
        self.memo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_memoized() {
        let mut index = PathIndex::new();
        let a = index.parse("a.b");
        let b = index.parse("a.b");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn namespace_change_invalidates() {
        let mut index = PathIndex::new();
        assert_eq!(index.parse("a").id, "a");

        index.set_namespace(Some("main")).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.parse("a").id, "main:a");
    }

    #[test]
    fn unchanged_settings_keep_memo() {
        let mut index = PathIndex::with(Some("main"), '.').unwrap();
        index.parse("a");
        index.set_namespace(Some("main")).unwrap();
        index.set_separator('.').unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn separator_change_invalidates() {
        let mut index = PathIndex::new();
        assert_eq!(index.parse("a/b").tokens, vec!["a/b"]);
        index.set_separator('/').unwrap();
        assert_eq!(index.parse("a/b").tokens, vec!["a", "b"]);
    }

    #[test]
    fn reserved_settings_rejected() {
        let mut index = PathIndex::new();
        assert_eq!(index.set_separator(':'), Err(PathError::ReservedSeparator(':')));
        assert!(index.set_namespace(Some("a:b")).is_err());
        assert!(index.set_namespace(Some("")).is_err());
    }
}
