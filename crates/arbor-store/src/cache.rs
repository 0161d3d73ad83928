//! Search cache
//!
//! Maps canonical address ids to the [`Resolution`] found for them. Entries
//! are grouped by the first traversal token so a mutation can purge every
//! entry that might have been affected by it (ancestors, descendants and
//! siblings alike).

use crate::config::CacheMode;
use arbor_collection::Resolution;
use arbor_path::ParsedIndex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    head: Option<String>,
    resolution: Resolution,
}

/// Per-store resolution cache
#[derive(Debug, Clone, Default)]
pub struct SearchCache {
    mode: CacheMode,
    entries: HashMap<String, Entry>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached resolutions
    pub entry_count: usize,
}

impl SearchCache {
    #[inline]
    #[must_use]
    pub fn new(mode: CacheMode) -> Self {
        Self {
            mode,
            entries: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Switch policy; always clears existing entries
    pub fn set_mode(&mut self, mode: CacheMode) {
        self.mode = mode;
        self.clear();
    }

    /// Cached resolution for an id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Resolution> {
        match self.mode {
            CacheMode::None => None,
            CacheMode::Simple => self.entries.get(id).map(|e| &e.resolution),
        }
    }

    /// Remember a resolution (no-op when caching is off)
    pub fn insert(&mut self, index: &ParsedIndex, resolution: Resolution) {
        if self.mode == CacheMode::None {
            return;
        }
        self.entries.insert(
            index.id.clone(),
            Entry {
                head: index.head().map(str::to_owned),
                resolution,
            },
        );
    }

    /// Purge entries a mutation at `index` may have invalidated
    ///
    /// Root and namespace-root mutations clear everything; any other mutation
    /// clears all entries sharing its first token.
    pub fn invalidate(&mut self, index: &ParsedIndex) {
        if index.is_namespace_root() {
            self.clear();
        } else {
            self.invalidate_head(index.head());
        }
    }

    /// Purge all entries whose first token is `head`
    pub fn invalidate_head(&mut self, head: Option<&str>) {
        match head {
            None => self.clear(),
            Some(head) => self
                .entries
                .retain(|_, entry| entry.head.as_deref() != Some(head)),
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
        }
    }
}
