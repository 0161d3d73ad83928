//! Structural merge of composites
//!
//! Both merges follow the same key rules: keyed entries overwrite (shallow)
//! or merge into (recursive) the entry of the same key, positional entries
//! are appended.

use crate::value::Value;

/// Shallow merge of `data` into `target`; later keys win
///
/// No-op unless both values are composites. A list target receiving keyed
/// entries is promoted to a map.
pub fn merge(target: &mut Value, data: Value) {
    if !target.is_composite() {
        return;
    }
    match data {
        Value::List(items) => {
            for item in items {
                target.push_child(item);
            }
        }
        Value::Map(map) => {
            for (key, value) in map {
                target.insert_child(&key, value);
            }
        }
        _ => {}
    }
}

/// Recursive merge of `data` into `target`
///
/// Keys present on both sides merge recursively when both values are
/// composites; otherwise the two values collide and are collected into a
/// list (`{"a": 1}` + `{"a": 2}` gives `{"a": [1, 2]}`). Positional entries
/// append.
pub fn merge_recursive(target: &mut Value, data: Value) {
    if !target.is_composite() {
        return;
    }
    match data {
        Value::List(items) => {
            for item in items {
                target.push_child(item);
            }
        }
        Value::Map(map) => {
            for (key, value) in map {
                match target.child_mut(&key) {
                    Some(existing) => {
                        let current = std::mem::take(existing);
                        *existing = collide(current, value);
                    }
                    None => {
                        target.insert_child(&key, value);
                    }
                }
            }
        }
        _ => {}
    }
}

fn collide(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (mut existing, incoming) if existing.is_composite() && incoming.is_composite() => {
            merge_recursive(&mut existing, incoming);
            existing
        }
        (mut existing, incoming) if existing.is_composite() => {
            existing.push_child(incoming);
            existing
        }
        (existing, incoming) => {
            let mut collected = Value::List(vec![existing]);
            if incoming.is_composite() {
                merge_recursive(&mut collected, incoming);
            } else {
                collected.push_child(incoming);
            }
            collected
        }
    }
}
