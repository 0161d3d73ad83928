//! Native snapshot converter
//!
//! Values are encoded with bincode and hex wrapped in a comment block, so the
//! file stays text and is recognisable on sight:
//!
//! ```text
//! /* arbor:native
//! 0700000000000000...
//! */
//! ```

use crate::error::{utf8, ConvertError, ConvertResult};
use crate::formats::Converter;
use crate::meta::ConverterMeta;
use arbor_collection::{Map, Value};
use serde::{Deserialize, Serialize};

const FORMAT: &str = "native";
const HEADER: &str = "/* arbor:native";
const FOOTER: &str = "*/";

/// Serializable mirror of [`Value`] without callables
#[derive(Debug, Serialize, Deserialize)]
enum Node {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Integer(i) => Self::Integer(*i),
            Value::Float(f) => Self::Float(*f),
            Value::String(s) => Self::String(s.clone()),
            Value::List(items) => Self::List(items.iter().filter_map(Self::from_value).collect()),
            Value::Map(map) => Self::Map(
                map.iter()
                    .filter_map(|(k, v)| Self::from_value(v).map(|node| (k.clone(), node)))
                    .collect(),
            ),
            Value::Callable(_) => return None,
        })
    }

    fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Integer(i) => Value::Integer(i),
            Self::Float(f) => Value::Float(f),
            Self::String(s) => Value::String(s),
            Self::List(items) => Value::List(items.into_iter().map(Self::into_value).collect()),
            Self::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect::<Map>(),
            ),
        }
    }
}

/// Native snapshot converter
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConverter;

impl NativeConverter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for NativeConverter {
    fn format(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["native"]
    }

    fn serialize(&self, value: &Value, _meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>> {
        let node = Node::from_value(value).unwrap_or(Node::Null);
        let encoded =
            bincode::serialize(&node).map_err(|e| ConvertError::unsupported(FORMAT, e.to_string()))?;
        Ok(format!("{HEADER}\n{}\n{FOOTER}\n", hex::encode(encoded)).into_bytes())
    }

    fn unserialize(&self, bytes: &[u8], _meta: &mut ConverterMeta) -> ConvertResult<Value> {
        let text = utf8(FORMAT, bytes)?.trim();
        if text.is_empty() {
            return Ok(Value::map());
        }
        let body = text
            .strip_prefix(HEADER)
            .and_then(|rest| rest.strip_suffix(FOOTER))
            .ok_or_else(|| ConvertError::syntax(FORMAT, "missing native snapshot markers"))?;
        let encoded: String = body.split_whitespace().collect();
        let raw = hex::decode(encoded)
            .map_err(|e| ConvertError::syntax(FORMAT, format!("invalid hex payload: {e}")))?;
        let node: Node = bincode::deserialize(&raw)
            .map_err(|e| ConvertError::syntax(FORMAT, format!("invalid payload: {e}")))?;
        Ok(node.into_value())
    }
}
