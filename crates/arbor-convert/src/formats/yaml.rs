//! YAML converter
//!
//! Goes through `serde_json::Value`, so mapping keys must be strings and
//! tags are ignored.

use crate::error::{utf8, ConvertError, ConvertResult};
use crate::formats::Converter;
use crate::meta::ConverterMeta;
use arbor_collection::Value;

const FORMAT: &str = "yaml";

/// YAML converter
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConverter;

impl YamlConverter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for YamlConverter {
    fn format(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn serialize(&self, value: &Value, _meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>> {
        serde_yaml::to_string(&value.to_json())
            .map(String::into_bytes)
            .map_err(|e| ConvertError::unsupported(FORMAT, e.to_string()))
    }

    fn unserialize(&self, bytes: &[u8], _meta: &mut ConverterMeta) -> ConvertResult<Value> {
        let text = utf8(FORMAT, bytes)?;
        if text.trim().is_empty() {
            return Ok(Value::map());
        }
        let json: serde_json::Value = serde_yaml::from_str(text)
            .map_err(|e| ConvertError::syntax(FORMAT, format!("YAML parse error: {e}")))?;
        Ok(Value::from(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_nested_documents() {
        let yaml = "server:\n  host: localhost\n  ports:\n    - 80\n    - 443\ndebug: true\n";
        let mut meta = ConverterMeta::new(FORMAT);
        let value = YamlConverter.unserialize(yaml.as_bytes(), &mut meta).unwrap();
        assert_eq!(
            value.to_json(),
            json!({"server": {"host": "localhost", "ports": [80, 443]}, "debug": true})
        );
    }

    #[test]
    fn round_trips_through_text() {
        let value = Value::from(json!({"b": {"x": 1.5, "y": null}, "a": ["s", false]}));
        let mut meta = ConverterMeta::new(FORMAT);
        let bytes = YamlConverter.serialize(&value, &mut meta).unwrap();
        assert_eq!(YamlConverter.unserialize(&bytes, &mut meta).unwrap(), value);
    }

    #[test]
    fn invalid_yaml_is_syntax_error() {
        let mut meta = ConverterMeta::new(FORMAT);
        let err = YamlConverter.unserialize(b"a: [1, 2", &mut meta).unwrap_err();
        assert!(matches!(err, ConvertError::Syntax { .. }));
    }
}
