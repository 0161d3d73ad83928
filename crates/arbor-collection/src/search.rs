//! Nested search with optional auto-vivification
//!
//! Resolution and mutation are split: [`search`] / [`search_mut`] return a
//! [`Resolution`] describing *where* a value lives (the token path of its
//! owning container plus the leaf key), and [`lookup`], [`assign`] and
//! [`detach`] act on that description. No live references escape.

use crate::value::Value;

/// Shape policy for composites created during auto-vivification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Always create keyed maps
    #[default]
    Map,
    /// Create lists when the next token is the append index `0`, maps otherwise
    List,
}

impl Shape {
    /// Empty composite able to hold `next_token` as its first child
    #[must_use]
    pub fn empty_for(self, next_token: &str) -> Value {
        match self {
            Self::List if next_token == "0" => Value::list(),
            _ => Value::map(),
        }
    }
}

/// Where an addressed value lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Whether the leaf currently exists
    pub exists: bool,
    /// Token path of the owning container
    pub container: Vec<String>,
    /// Leaf key inside the container; `None` addresses the root itself
    pub key: Option<String>,
}

impl Resolution {
    /// The root container
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self {
            exists: true,
            container: Vec::new(),
            key: None,
        }
    }

    /// Full token path (container plus key)
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = self.container.clone();
        tokens.extend(self.key.iter().cloned());
        tokens
    }
}

fn walk<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, token| current.child(token))
}

fn walk_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |current, token| current.child_mut(token))
}

/// Resolve `tokens` without modifying the container
#[must_use]
pub fn search(root: &Value, tokens: &[String]) -> Resolution {
    let Some((last, parent)) = tokens.split_last() else {
        return Resolution::root();
    };
    let exists = walk(root, parent)
        .and_then(|container| container.child(last))
        .is_some();
    Resolution {
        exists,
        container: parent.to_vec(),
        key: Some(last.clone()),
    }
}

/// Resolve `tokens`, creating every missing intermediate container
///
/// Intermediates that exist but are leaves are replaced by empty composites.
/// The leaf itself is never created; use [`assign`] for that.
pub fn search_mut(root: &mut Value, tokens: &[String], shape: Shape) -> Resolution {
    let Some((last, parent)) = tokens.split_last() else {
        return Resolution::root();
    };
    if !root.is_composite() {
        *root = Value::map();
    }

    let mut current = root;
    for (i, token) in parent.iter().enumerate() {
        let next = &tokens[i + 1];
        if !current.child(token).is_some_and(Value::is_composite) {
            current.insert_child(token, shape.empty_for(next));
        }
        current = match current.child_mut(token) {
            Some(child) => child,
            None => {
                return Resolution {
                    exists: false,
                    container: parent.to_vec(),
                    key: Some(last.clone()),
                }
            }
        };
    }

    Resolution {
        exists: current.child(last).is_some(),
        container: parent.to_vec(),
        key: Some(last.clone()),
    }
}

/// Value described by a resolution
#[must_use]
pub fn lookup<'a>(root: &'a Value, resolution: &Resolution) -> Option<&'a Value> {
    let container = walk(root, &resolution.container)?;
    match &resolution.key {
        Some(key) => container.child(key),
        None => Some(container),
    }
}

/// Mutable value described by a resolution
pub fn lookup_mut<'a>(root: &'a mut Value, resolution: &Resolution) -> Option<&'a mut Value> {
    let container = walk_mut(root, &resolution.container)?;
    match &resolution.key {
        Some(key) => container.child_mut(key),
        None => Some(container),
    }
}

/// Store `value` at the resolved location
///
/// Returns `false` when the owning container no longer exists.
pub fn assign(root: &mut Value, resolution: &Resolution, value: Value) -> bool {
    let Some(container) = walk_mut(root, &resolution.container) else {
        return false;
    };
    match &resolution.key {
        Some(key) => container.insert_child(key, value),
        None => {
            *container = value;
            true
        }
    }
}

/// Remove and return the resolved value
///
/// A root resolution empties the container in place instead of removing it.
pub fn detach(root: &mut Value, resolution: &Resolution) -> Option<Value> {
    let container = walk_mut(root, &resolution.container)?;
    match &resolution.key {
        Some(key) => container.remove_child(key),
        None => {
            let empty = match container {
                Value::List(_) => Value::list(),
                _ => Value::map(),
            };
            Some(std::mem::replace(container, empty))
        }
    }
}
