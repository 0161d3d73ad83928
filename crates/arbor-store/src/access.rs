//! String-addressed store API
//!
//! [`PathStore`] supplies every address-based operation on top of a
//! [`NestedStore`]. Implementors only expose their inner store and may
//! override [`PathStore::prepare`], which runs after parsing and before
//! every access (persistent stores use it to autoload namespaces).

use crate::coerce;
use crate::store::NestedStore;
use arbor_collection::{Callable, Map, Number, Value};
use arbor_path::{ParsedIndex, TypeHint};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Address-based access to a nested store
pub trait PathStore {
    /// Inner store
    fn nested(&self) -> &NestedStore;

    /// Inner store, mutable
    fn nested_mut(&mut self) -> &mut NestedStore;

    /// Hook run before every access to `index`
    fn prepare(&mut self, _index: &ParsedIndex) {}

    /// Parse `address` and run the access hook
    fn locate(&mut self, address: &str) -> Arc<ParsedIndex> {
        let index = self.nested_mut().parse(address);
        self.prepare(&index);
        index
    }

    /// Value at `address`, coerced when it carries a `!type` suffix
    fn get(&mut self, address: &str) -> Option<Value> {
        let index = self.locate(address);
        self.nested_mut().read(&index)
    }

    /// Value at `address`, or `default` when unresolved or rejected
    fn get_or(&mut self, address: &str, default: Value) -> Value {
        self.get(address).unwrap_or(default)
    }

    /// Raw value coerced with `hint`, ignoring any suffix in the address
    fn get_as(&mut self, address: &str, hint: &TypeHint) -> Option<Value> {
        let index = self.locate(address);
        self.nested_mut()
            .read_raw(&index)
            .and_then(|value| coerce::coerce(value, hint))
    }

    fn get_string(&mut self, address: &str) -> Option<String> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_string)
    }

    fn get_number(&mut self, address: &str) -> Option<Number> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_number)
    }

    fn get_integer(&mut self, address: &str) -> Option<i64> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_integer)
    }

    fn get_float(&mut self, address: &str) -> Option<f64> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_float)
    }

    fn get_boolean(&mut self, address: &str) -> Option<bool> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_boolean)
    }

    fn get_array(&mut self, address: &str) -> Option<Value> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_array)
    }

    fn get_object(&mut self, address: &str) -> Option<Map> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_object)
    }

    fn get_callable(&mut self, address: &str) -> Option<Callable> {
        let index = self.locate(address);
        self.nested_mut().read_raw(&index).and_then(coerce::to_callable)
    }

    /// Assign a value, creating missing intermediate containers
    fn set(&mut self, address: &str, value: impl Into<Value>)
    where
        Self: Sized,
    {
        let index = self.locate(address);
        self.nested_mut().write(&index, value.into());
    }

    /// Merge `data` into the existing value (see [`NestedStore::merge`])
    fn extend(&mut self, address: &str, data: impl Into<Value>, recursive: bool)
    where
        Self: Sized,
    {
        let index = self.locate(address);
        self.nested_mut().merge(&index, data.into(), recursive);
    }

    /// Remove the value (or empty the namespace for a key-less address)
    fn clear(&mut self, address: &str) {
        let index = self.locate(address);
        self.nested_mut().remove(&index);
    }

    /// Whether `address` resolves
    fn exist(&mut self, address: &str) -> bool {
        let index = self.locate(address);
        self.nested_mut().contains(&index)
    }

    /// Visit the direct children of the composite at `address`
    ///
    /// `f` receives the child key, its value, its full address and the store.
    /// Children are snapshotted first, so `f` may mutate the store. Returns
    /// `false` when `f` stopped the iteration.
    fn each<F>(&mut self, address: &str, mut f: F) -> bool
    where
        Self: Sized,
        F: FnMut(&str, &Value, &str, &mut Self) -> ControlFlow<()>,
    {
        let index = self.locate(address);
        let separator = self.nested().separator();
        let children = self.nested_mut().children(&index);
        for (key, value) in children {
            let full = index.child_address(&key, separator);
            if f(&key, &value, &full, self).is_break() {
                return false;
            }
        }
        true
    }
}

impl PathStore for NestedStore {
    #[inline]
    fn nested(&self) -> &NestedStore {
        self
    }

    #[inline]
    fn nested_mut(&mut self) -> &mut NestedStore {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn set_get_through_trait() {
        let mut store = NestedStore::new();
        store.set("a.b.c.d", 7);
        assert_eq!(store.get("a.b.c.d"), Some(Value::from(7)));
        assert_eq!(store.get_or("a.x", Value::from("dflt")), Value::from("dflt"));
        assert!(store.exist("a.b"));
        assert!(!store.exist("a.b.z"));
    }

    #[test]
    fn typed_getters() {
        let mut store = NestedStore::new();
        store.set("v.int", "12");
        store.set("v.frac", "12.5");
        store.set("v.flag", "2");
        store.set("v.list", Value::from(json!([1, 2])));

        assert_eq!(store.get_integer("v.int"), Some(12));
        assert_eq!(store.get_integer("v.frac"), None);
        assert_eq!(store.get_float("v.frac"), Some(12.5));
        assert_eq!(store.get_boolean("v.flag"), None);
        assert_eq!(store.get_string("v.int"), Some("12".into()));
        assert_eq!(store.get_object("v.list").map(|m| m.len()), Some(2));
        assert!(store.get_callable("v.int").is_none());
        assert_eq!(store.get_as("v.int", &TypeHint::Number), Some(Value::from(12)));
    }

    #[test]
    fn callables_round_trip() {
        let mut store = NestedStore::new();
        store.set("fn", Callable::new(|_| Value::from("called")));
        let f = store.get_callable("fn").unwrap();
        assert_eq!(f.call(&[]), Value::from("called"));
    }

    #[test]
    fn default_namespace_addresses() {
        let mut store = NestedStore::with_config(StoreConfig::new().with_namespace("app")).unwrap();
        store.set("k", 1);
        store.set("other:k", 2);
        assert_eq!(store.get("app:k"), Some(Value::from(1)));
        assert_eq!(store.get("k"), Some(Value::from(1)));
        assert_eq!(store.get("other:k"), Some(Value::from(2)));
        assert_eq!(store.root().to_json(), json!({"app": {"k": 1}, "other": {"k": 2}}));
    }

    #[test]
    fn each_visits_in_insertion_order_and_stops() {
        let mut store = NestedStore::new();
        store.set("ns:z", 1);
        store.set("ns:a", 2);
        store.set("ns:m", 3);

        let mut seen = Vec::new();
        let completed = store.each("ns:", |key, _, full, _| {
            seen.push((key.to_owned(), full.to_owned()));
            if key == "a" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(!completed);
        assert_eq!(
            seen,
            vec![("z".to_owned(), "ns:z".to_owned()), ("a".to_owned(), "ns:a".to_owned())]
        );
    }

    #[test]
    fn each_callback_may_mutate() {
        let mut store = NestedStore::new();
        store.set("prices.a", 1);
        store.set("prices.b", 2);
        store.each("prices", |_, value, full, store| {
            let doubled = value.as_i64().unwrap_or_default() * 2;
            store.set(full, doubled);
            ControlFlow::Continue(())
        });
        assert_eq!(store.get("prices").map(|v| v.to_json()), Some(json!({"a": 2, "b": 4})));
    }
}
