//! JSON converter
//!
//! Uses serde_json with insertion order preserved. Output is pretty printed.

use crate::error::{utf8, ConvertError, ConvertResult};
use crate::formats::Converter;
use crate::meta::ConverterMeta;
use arbor_collection::Value;

const FORMAT: &str = "json";

/// JSON converter
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl JsonConverter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for JsonConverter {
    fn format(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn serialize(&self, value: &Value, _meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&value.to_json())
            .map_err(|e| ConvertError::unsupported(FORMAT, e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn unserialize(&self, bytes: &[u8], _meta: &mut ConverterMeta) -> ConvertResult<Value> {
        let text = utf8(FORMAT, bytes)?;
        if text.trim().is_empty() {
            return Ok(Value::map());
        }
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ConvertError::syntax(FORMAT, format!("JSON parse error: {e}")))?;
        Ok(Value::from(json))
    }
}
