//! Arbor Path Index
//!
//! Parses string addresses of the form `[namespace:]key[.key...][!type]`
//! into [`ParsedIndex`] values and memoizes them per store through
//! [`PathIndex`].
//!
//! # Example
//!
//! ```rust
//! use arbor_path::{PathIndex, TypeHint};
//!
//! let mut index = PathIndex::new();
//! let parsed = index.parse("app:server..port!integer");
//!
//! assert_eq!(parsed.id, "app:server.port");
//! assert_eq!(parsed.tokens, vec!["app", "server", "port"]);
//! assert_eq!(parsed.kind, Some(TypeHint::Integer));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod address;
mod index;

pub use address::{
    ParsedIndex, TypeHint, DEFAULT_KEY_SEPARATOR, NAMESPACE_SEPARATOR, TYPE_SEPARATOR,
};
pub use index::{PathError, PathIndex};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Stray separators never change the canonical id.
        #[test]
        fn stray_separators_are_idempotent(
            segments in prop::collection::vec("[a-z0-9_]{1,5}", 1..5),
            pad in 1usize..4,
        ) {
            let clean = segments.join(".");
            let padded = segments.join(&".".repeat(pad)) + ".";
            let a = ParsedIndex::parse(&clean, Some("ns"), '.');
            let b = ParsedIndex::parse(&format!(".{padded}"), Some("ns"), '.');
            prop_assert_eq!(&a.id, &b.id);
            prop_assert_eq!(&a.tokens, &b.tokens);
            prop_assert!(!a.tokens.is_empty());
        }
    }
}
