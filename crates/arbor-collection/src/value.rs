//! Dynamic value model
//!
//! Provides [`Value`], the node type of every Arbor container, and
//! [`Callable`] for invokable leaves.

use indexmap::IndexMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Ordered string-keyed mapping used for keyed composites
pub type Map = IndexMap<String, Value>;

/// A node of the nested container
///
/// `List` and `Map` are the two composite shapes; everything else is a leaf.
/// Cloning a value is a deep copy of its composite structure (callables are
/// shared, not duplicated).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent / explicit null
    #[default]
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Signed integer leaf
    Integer(i64),
    /// Floating point leaf
    Float(f64),
    /// Text leaf
    String(String),
    /// Positional composite
    List(Vec<Value>),
    /// Keyed composite, insertion ordered
    Map(Map),
    /// Invokable leaf (never persisted)
    Callable(Callable),
}

/// Shared invokable value
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Callable {
    /// Wrap a function
    #[inline]
    #[must_use]
    pub fn new(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke with arguments
    #[inline]
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Value {
    /// Empty keyed composite
    #[inline]
    #[must_use]
    pub fn map() -> Self {
        Self::Map(Map::new())
    }

    /// Empty positional composite
    #[inline]
    #[must_use]
    pub fn list() -> Self {
        Self::List(Vec::new())
    }

    /// Short name of the variant, used in diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Callable(_) => "callable",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for `List` and `Map`
    #[inline]
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric leaves as `f64`
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Number of direct children (0 for leaves)
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Map(map) => map.len(),
            _ => 0,
        }
    }

    /// True when the value has no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct child by key
    ///
    /// Lists are addressed by canonical decimal index (`"0"`, `"1"`, not `"01"`).
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            Self::List(list) => parse_index(key).and_then(|i| list.get(i)),
            _ => None,
        }
    }

    /// Mutable direct child by key
    pub fn child_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Self::Map(map) => map.get_mut(key),
            Self::List(list) => parse_index(key).and_then(|i| list.get_mut(i)),
            _ => None,
        }
    }

    /// Insert or replace a direct child
    ///
    /// A list accepts an existing index or the append index; any other key
    /// promotes the list to a map keyed by index. Leaves accept nothing and
    /// return `false`.
    pub fn insert_child(&mut self, key: &str, value: Value) -> bool {
        match self {
            Self::Map(map) => {
                map.insert(key.to_owned(), value);
                true
            }
            Self::List(list) => {
                match parse_index(key) {
                    Some(i) if i < list.len() => {
                        list[i] = value;
                        return true;
                    }
                    Some(i) if i == list.len() => {
                        list.push(value);
                        return true;
                    }
                    _ => {}
                }
                let mut map = list_to_map(std::mem::take(list));
                map.insert(key.to_owned(), value);
                *self = Self::Map(map);
                true
            }
            _ => false,
        }
    }

    /// Remove a direct child, preserving the order of the remaining ones
    pub fn remove_child(&mut self, key: &str) -> Option<Value> {
        match self {
            Self::Map(map) => map.shift_remove(key),
            Self::List(list) => match parse_index(key) {
                Some(i) if i < list.len() => Some(list.remove(i)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Append a child: lists push, maps take the next free integer key
    pub fn push_child(&mut self, value: Value) -> bool {
        match self {
            Self::List(list) => {
                list.push(value);
                true
            }
            Self::Map(map) => {
                let next = map
                    .keys()
                    .filter_map(|k| parse_index(k))
                    .max()
                    .map_or(0, |i| i + 1);
                map.insert(next.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Direct children as `(key, value)` pairs in insertion order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, &Value)> {
        match self {
            Self::Map(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Self::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Keyed-object form of a composite (lists are keyed by index)
    #[must_use]
    pub fn into_map(self) -> Option<Map> {
        match self {
            Self::Map(map) => Some(map),
            Self::List(list) => Some(list_to_map(list)),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`
    ///
    /// Callables have no JSON form: they are dropped from composites and
    /// become `null` at the top level. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null | Self::Callable(_) => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::List(list) => Json::Array(
                list.iter()
                    .filter(|v| !matches!(v, Self::Callable(_)))
                    .map(Self::to_json)
                    .collect(),
            ),
            Self::Map(map) => Json::Object(
                map.iter()
                    .filter(|(_, v)| !matches!(v, Self::Callable(_)))
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Canonical list index: decimal digits without leading zeros
#[must_use]
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn list_to_map(list: Vec<Value>) -> Map {
    list.into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Self::List(list)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Self::Callable(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
