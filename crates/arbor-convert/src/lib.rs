//! Arbor Format Converters
//!
//! Two-way codecs between stored [`Value`] trees and file contents.
//!
//! # Core Concepts
//!
//! - [`Converter`]: `serialize` / `unserialize` plus the file extensions a
//!   format owns
//! - [`ConverterMeta`]: per-namespace side channel for format details that
//!   do not live in the value (XML root name, attribute paths)
//! - [`ConverterRegistry`]: format name → converter, with an optional hook
//!   that supplies converters on demand
//!
//! # Example
//!
//! ```rust
//! use arbor_convert::{default_converters, ConverterMeta};
//! use arbor_collection::Value;
//!
//! let registry = default_converters();
//! let xml = registry.get("xml").unwrap();
//!
//! let mut meta = ConverterMeta::new("xml");
//! let value = xml.unserialize(b"<config><port>80</port></config>", &mut meta).unwrap();
//! assert_eq!(value.child("port"), Some(&Value::from(80)));
//! assert_eq!(meta.root(), Some("config"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
pub mod formats;
mod meta;

pub use error::{ConvertError, ConvertResult};
pub use formats::{
    default_converters, Converter, ConverterRegistry, IniConverter, JsonConverter,
    MissingConverterHook, NativeConverter, XmlConverter, YamlConverter,
};
pub use meta::{ConverterMeta, ROOT_KEY};

pub use arbor_collection::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use arbor_collection::Map;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e6..1.0e6f64).prop_map(Value::Float),
            "[a-z ]{1,12}".prop_map(Value::String),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        scalar().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Value::List),
                prop::collection::vec(("[a-z][a-z0-9_]{0,6}", inner), 1..4)
                    .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
            ]
        })
    }

    fn document() -> impl Strategy<Value = Value> {
        prop::collection::vec(("[a-z][a-z0-9_]{0,6}", tree()), 0..5)
            .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>()))
    }

    fn round_trip(format: &str, value: &Value) -> Value {
        let registry = default_converters();
        let converter = registry.get(format).unwrap();
        let mut meta = ConverterMeta::new(format);
        let bytes = converter.serialize(value, &mut meta).unwrap();
        converter.unserialize(&bytes, &mut meta).unwrap()
    }

    /// XML list paths are shared by every item, so lists only hold leaves
    fn xml_document() -> impl Strategy<Value = Value> {
        let tree = scalar().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(scalar(), 1..4).prop_map(Value::List),
                prop::collection::vec(("[a-z][a-z0-9_]{0,6}", inner), 1..4)
                    .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
            ]
        });
        prop::collection::vec(("[a-z][a-z0-9_]{0,6}", tree), 0..5)
            .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>()))
    }

    proptest! {
        #[test]
        fn json_round_trip(value in document()) {
            prop_assert_eq!(round_trip("json", &value), value);
        }

        #[test]
        fn yaml_round_trip(value in document()) {
            prop_assert_eq!(round_trip("yaml", &value), value);
        }

        #[test]
        fn native_round_trip(value in document()) {
            prop_assert_eq!(round_trip("native", &value), value);
        }

        #[test]
        fn xml_round_trip(value in xml_document()) {
            prop_assert_eq!(round_trip("xml", &value), value);
        }
    }
}
