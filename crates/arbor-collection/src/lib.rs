//! Arbor Collection Utilities
//!
//! The value model shared by every Arbor layer, plus the primitives the
//! stores are built from.
//!
//! # Core Concepts
//!
//! - [`Value`]: dynamic node (scalars, `List`, ordered `Map`, [`Callable`])
//! - [`search`] / [`search_mut`]: resolve a token path, optionally creating
//!   missing intermediate containers
//! - [`Resolution`]: by-value description of where a value lives, consumed by
//!   [`assign`], [`lookup`] and [`detach`]
//! - [`merge`] / [`merge_recursive`]: structural merge of composites
//! - Type predicates: [`is_enumerable`], [`is_numeric`], [`is_textual`]
//!
//! # Example
//!
//! ```rust
//! use arbor_collection::{assign, lookup, search_mut, Shape, Value};
//!
//! let mut root = Value::map();
//! let tokens: Vec<String> = ["db", "primary", "port"].map(String::from).to_vec();
//!
//! let res = search_mut(&mut root, &tokens, Shape::Map);
//! assign(&mut root, &res, Value::from(5432));
//! assert_eq!(lookup(&root, &res), Some(&Value::from(5432)));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod merge;
mod predicate;
mod search;
mod value;

pub use merge::{merge, merge_recursive};
pub use predicate::{
    as_number, is_callable, is_enumerable, is_numeric, is_textual, parse_numeric, Number,
};
pub use search::{assign, detach, lookup, lookup_mut, search, search_mut, Resolution, Shape};
pub use value::{parse_index, Callable, Map, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    proptest! {
        /// Assigning through a vivified resolution is always readable back.
        #[test]
        fn assign_then_lookup(path in prop::collection::vec(segment(), 1..6), leaf in any::<i64>()) {
            let mut root = Value::map();
            let res = search_mut(&mut root, &path, Shape::Map);
            prop_assert!(assign(&mut root, &res, Value::from(leaf)));

            let found = search(&root, &path);
            prop_assert!(found.exists);
            prop_assert_eq!(lookup(&root, &found), Some(&Value::Integer(leaf)));
        }
    }
}
