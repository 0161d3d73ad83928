//! Nested in-memory store
//!
//! [`NestedStore`] owns the container root, the [`PathIndex`] and the
//! [`SearchCache`]. Its methods take an already parsed address; the string
//! based API lives on the [`PathStore`](crate::PathStore) trait so wrappers
//! can hook in before every access.

use crate::cache::{CacheStats, SearchCache};
use crate::coerce::coerce;
use crate::config::{CacheMode, StoreConfig};
use arbor_collection::{
    as_number, assign, detach, lookup, lookup_mut, merge, merge_recursive, search, search_mut,
    Resolution, Shape, Value,
};
use arbor_path::{ParsedIndex, PathError, PathIndex};
use std::sync::Arc;

/// In-memory nested container addressed by parsed paths
#[derive(Debug, Clone)]
pub struct NestedStore {
    root: Value,
    index: PathIndex,
    cache: SearchCache,
    shape: Shape,
}

impl Default for NestedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NestedStore {
    /// Create empty store with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let config = StoreConfig::default();
        Self {
            root: Value::map(),
            index: PathIndex::new(),
            cache: SearchCache::new(config.cache),
            shape: config.shape,
        }
    }

    /// Create empty store from configuration
    ///
    /// # Errors
    /// Returns error if the namespace or separator is reserved
    pub fn with_config(config: StoreConfig) -> Result<Self, PathError> {
        Ok(Self {
            root: Value::map(),
            index: PathIndex::with(config.namespace.as_deref(), config.separator)?,
            cache: SearchCache::new(config.cache),
            shape: config.shape,
        })
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            namespace: self.index.namespace().map(str::to_owned),
            separator: self.index.separator(),
            cache: self.cache.mode(),
            shape: self.shape,
        }
    }

    /// Parse an address with the store's namespace and separator
    #[inline]
    pub fn parse(&mut self, address: &str) -> Arc<ParsedIndex> {
        self.index.parse(address)
    }

    /// Whole container
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume the store, returning its container
    #[inline]
    #[must_use]
    pub fn into_root(self) -> Value {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn separator(&self) -> char {
        self.index.separator()
    }

    #[inline]
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Change the default namespace (clears the path index)
    ///
    /// # Errors
    /// Returns error if the name is reserved
    pub fn set_namespace(&mut self, namespace: Option<&str>) -> Result<(), PathError> {
        self.index.set_namespace(namespace)
    }

    /// Change the key separator (clears the path index and search cache)
    ///
    /// # Errors
    /// Returns error if the separator is reserved
    pub fn set_separator(&mut self, separator: char) -> Result<(), PathError> {
        self.index.set_separator(separator)?;
        self.cache.clear();
        Ok(())
    }

    /// Change the cache policy (clears the search cache)
    pub fn set_cache_mode(&mut self, mode: CacheMode) {
        self.cache.set_mode(mode);
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// Cache-aware resolution, never creates anything
    pub fn resolve(&mut self, index: &ParsedIndex) -> Resolution {
        if let Some(hit) = self.cache.get(&index.id) {
            return hit.clone();
        }
        let resolution = search(&self.root, &index.tokens);
        self.cache.insert(index, resolution.clone());
        resolution
    }

    /// Raw value at `index`, ignoring any type suffix
    pub fn read_raw(&mut self, index: &ParsedIndex) -> Option<&Value> {
        let resolution = self.resolve(index);
        if !resolution.exists {
            return None;
        }
        lookup(&self.root, &resolution)
    }

    /// Value at `index`, coerced when the address carries a type suffix
    pub fn read(&mut self, index: &ParsedIndex) -> Option<Value> {
        let value = self.read_raw(index)?;
        match &index.kind {
            Some(kind) => coerce(value, kind),
            None => Some(value.clone()),
        }
    }

    /// Whether `index` resolves
    pub fn contains(&mut self, index: &ParsedIndex) -> bool {
        self.resolve(index).exists
    }

    /// Assign `value`, creating missing intermediates
    ///
    /// An empty key replaces the whole namespace; the container root only
    /// accepts composites.
    pub fn write(&mut self, index: &ParsedIndex, value: Value) {
        self.cache.invalidate(index);
        if index.is_root() {
            match value.into_map() {
                Some(map) => self.root = Value::Map(map),
                None => tracing::debug!("ignoring non-composite value for container root"),
            }
            return;
        }
        let resolution = search_mut(&mut self.root, &index.tokens, self.shape);
        assign(&mut self.root, &resolution, value);
    }

    /// Merge `data` into the value at `index`
    ///
    /// Absent (or null) → `data`; numbers add; strings concatenate;
    /// composites merge (shallow or recursive); other pairs are left alone.
    pub fn merge(&mut self, index: &ParsedIndex, data: Value, recursive: bool) {
        self.cache.invalidate(index);
        let resolution = if index.is_root() {
            Resolution::root()
        } else {
            search_mut(&mut self.root, &index.tokens, self.shape)
        };

        match lookup_mut(&mut self.root, &resolution) {
            Some(existing) if !existing.is_null() => combine(existing, data, recursive),
            _ => {
                assign(&mut self.root, &resolution, data);
            }
        }
    }

    /// Remove the value at `index` without creating anything
    ///
    /// An address without key segment empties the addressed container.
    pub fn remove(&mut self, index: &ParsedIndex) {
        let resolution = search(&self.root, &index.tokens);
        if !resolution.exists {
            return;
        }
        self.cache.invalidate(index);

        if index.is_namespace_root() {
            if let Some(target) = lookup_mut(&mut self.root, &resolution) {
                *target = match target {
                    Value::List(_) => Value::list(),
                    _ => Value::map(),
                };
            }
        } else {
            detach(&mut self.root, &resolution);
        }
    }

    /// Direct children of the composite at `index`, cloned in insertion order
    pub fn children(&mut self, index: &ParsedIndex) -> Vec<(String, Value)> {
        self.read_raw(index)
            .map(|value| {
                value
                    .entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value stored directly under a namespace (root for `None`)
    #[must_use]
    pub fn namespace_value(&self, namespace: Option<&str>) -> Option<&Value> {
        match namespace {
            Some(ns) => self.root.child(ns),
            None => Some(&self.root),
        }
    }

    /// Replace a namespace subtree wholesale (root for `None`)
    pub fn replace_namespace(&mut self, namespace: Option<&str>, value: Value) {
        self.cache.invalidate_head(namespace);
        match namespace {
            Some(ns) => {
                self.root.insert_child(ns, value);
            }
            None => {
                self.root = value.into_map().map_or_else(Value::map, Value::Map);
            }
        }
    }

    /// Drop a namespace subtree (empties the root for `None`)
    pub fn drop_namespace(&mut self, namespace: Option<&str>) -> Option<Value> {
        self.cache.invalidate_head(namespace);
        match namespace {
            Some(ns) => self.root.remove_child(ns),
            None => Some(std::mem::replace(&mut self.root, Value::map())),
        }
    }

    /// Drop all data and cached resolutions, keep configuration
    pub fn reset(&mut self) {
        self.root = Value::map();
        self.cache.clear();
    }
}

fn combine(existing: &mut Value, data: Value, recursive: bool) {
    if let (Some(a), Some(b)) = (as_number(existing), as_number(&data)) {
        *existing = Value::from(a.sum(b));
        return;
    }
    match (existing, data) {
        (Value::String(a), Value::String(b)) => a.push_str(&b),
        (existing, data) if existing.is_composite() && data.is_composite() => {
            if recursive {
                merge_recursive(existing, data);
            } else {
                merge(existing, data);
            }
        }
        (existing, data) => tracing::trace!(
            existing = existing.type_name(),
            data = data.type_name(),
            "incompatible extend ignored"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> NestedStore {
        NestedStore::new()
    }

    fn idx(store: &mut NestedStore, address: &str) -> Arc<ParsedIndex> {
        store.parse(address)
    }

    #[test]
    fn write_then_read() {
        let mut s = store();
        let i = idx(&mut s, "a.b.c");
        s.write(&i, Value::from(3));
        assert_eq!(s.read(&i), Some(Value::from(3)));
        assert_eq!(s.root().to_json(), json!({"a": {"b": {"c": 3}}}));
    }

    #[test]
    fn read_applies_type_suffix() {
        let mut s = store();
        let i = idx(&mut s, "n");
        s.write(&i, Value::from("42"));
        let typed = idx(&mut s, "n!integer");
        assert_eq!(s.read(&typed), Some(Value::from(42)));
        let bad = idx(&mut s, "n!boolean");
        assert_eq!(s.read(&bad), None);
    }

    #[test]
    fn cached_miss_is_purged_by_write() {
        let mut s = store();
        let i = idx(&mut s, "a.b");
        assert_eq!(s.read(&i), None);
        assert_eq!(s.cache_stats().entry_count, 1);

        let deeper = idx(&mut s, "a.b.c");
        s.write(&deeper, Value::from(1));
        assert_eq!(s.read(&i), Some(Value::from(json!({"c": 1}))));
    }

    #[test]
    fn root_write_requires_composite() {
        let mut s = store();
        let root = idx(&mut s, "");
        s.write(&root, Value::from(5));
        assert_eq!(s.root(), &Value::map());
        s.write(&root, Value::from(json!({"x": 1})));
        assert_eq!(s.root().to_json(), json!({"x": 1}));
    }

    #[test]
    fn merge_rules() {
        let mut s = store();
        let i = idx(&mut s, "x");
        s.merge(&i, Value::from(2), false);
        s.merge(&i, Value::from(2), false);
        assert_eq!(s.read(&i), Some(Value::from(4)));

        let t = idx(&mut s, "t");
        s.write(&t, Value::from("a"));
        s.merge(&t, Value::from("b"), false);
        assert_eq!(s.read(&t), Some(Value::from("ab")));

        s.merge(&t, Value::from(json!({"k": 1})), false);
        assert_eq!(s.read(&t), Some(Value::from("ab")));
    }

    #[test]
    fn numeric_text_adds() {
        let mut s = store();
        let i = idx(&mut s, "x");
        s.write(&i, Value::from("1,5"));
        s.merge(&i, Value::from(1), false);
        assert_eq!(s.read(&i), Some(Value::Float(2.5)));
    }

    #[test]
    fn remove_leaf_and_namespace_root() {
        let mut s = store();
        let leaf = idx(&mut s, "ns:a.b");
        s.write(&leaf, Value::from(1));
        let other = idx(&mut s, "ns:c");
        s.write(&other, Value::from(2));

        s.remove(&leaf);
        assert_eq!(s.read(&leaf), None);
        assert_eq!(s.read(&other), Some(Value::from(2)));

        let ns = idx(&mut s, "ns:");
        s.remove(&ns);
        assert_eq!(s.read(&ns), Some(Value::map()));
        assert_eq!(s.read(&other), None);
    }

    #[test]
    fn remove_missing_does_not_vivify() {
        let mut s = store();
        let i = idx(&mut s, "a.b.c");
        s.remove(&i);
        assert_eq!(s.root(), &Value::map());
    }

    #[test]
    fn replace_namespace_invalidates() {
        let mut s = store();
        let i = idx(&mut s, "ns:k");
        assert_eq!(s.read(&i), None);
        s.replace_namespace(Some("ns"), Value::from(json!({"k": "loaded"})));
        assert_eq!(s.read(&i), Some(Value::from("loaded")));
    }

    #[test]
    fn cache_off_still_correct() {
        let mut s = NestedStore::with_config(StoreConfig::new().with_cache(CacheMode::None)).unwrap();
        let i = idx(&mut s, "a");
        s.write(&i, Value::from(1));
        assert_eq!(s.read(&i), Some(Value::from(1)));
        assert_eq!(s.cache_stats().entry_count, 0);
    }
}
