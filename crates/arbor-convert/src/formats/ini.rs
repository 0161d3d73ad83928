//! INI converter
//!
//! Nested values are flattened to dotted keys, one assignment per line:
//!
//! ```text
//! server.host="localhost"
//! server.ports.0=80
//! server.ports.1=443
//! debug=true
//! ```
//!
//! Strings are quoted with backslash escapes; numbers, booleans and `null`
//! are bare; empty composites are written as `{}` and `[]`. On read,
//! `[section]` headers prefix the keys below them, `;` and `#` start
//! comments, and keys whose next segment is `0` become lists.
//!
//! Maps keyed `0`, `1`, ... are therefore read back as lists. No metadata is
//! recorded to tell the two apart.

use crate::error::{utf8, ConvertError, ConvertResult};
use crate::formats::Converter;
use crate::meta::ConverterMeta;
use arbor_collection::{assign, search_mut, Shape, Value};
use std::fmt::Write as _;

const FORMAT: &str = "ini";

/// INI converter
#[derive(Debug, Clone, Copy, Default)]
pub struct IniConverter;

impl IniConverter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for IniConverter {
    fn format(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["ini"]
    }

    fn serialize(&self, value: &Value, _meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>> {
        if !value.is_composite() {
            return Err(ConvertError::unsupported(
                FORMAT,
                format!("top level must be a composite, got {}", value.type_name()),
            ));
        }
        let mut out = String::new();
        flatten(&mut out, "", value)?;
        Ok(out.into_bytes())
    }

    fn unserialize(&self, bytes: &[u8], _meta: &mut ConverterMeta) -> ConvertResult<Value> {
        let text = utf8(FORMAT, bytes)?;
        let mut root = Value::map();
        let mut section = String::new();

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| {
                    ConvertError::syntax(FORMAT, format!("line {}: unclosed section", number + 1))
                })?;
                section = name.trim().to_owned();
                continue;
            }
            let (key, raw_value) = line.split_once('=').ok_or_else(|| {
                ConvertError::syntax(FORMAT, format!("line {}: expected key=value", number + 1))
            })?;

            let tokens: Vec<String> = section
                .split('.')
                .chain(key.trim().split('.'))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect();
            if tokens.is_empty() {
                return Err(ConvertError::syntax(
                    FORMAT,
                    format!("line {}: empty key", number + 1),
                ));
            }
            let value = parse_value(raw_value.trim()).map_err(|message| {
                ConvertError::syntax(FORMAT, format!("line {}: {message}", number + 1))
            })?;

            let resolution = search_mut(&mut root, &tokens, Shape::List);
            assign(&mut root, &resolution, value);
        }
        Ok(root)
    }
}

fn flatten(out: &mut String, prefix: &str, value: &Value) -> ConvertResult<()> {
    match value {
        Value::Callable(_) => Ok(()),
        Value::Map(_) | Value::List(_) if value.is_empty() => {
            if !prefix.is_empty() {
                let empty = if matches!(value, Value::List(_)) { "[]" } else { "{}" };
                let _ = writeln!(out, "{prefix}={empty}");
            }
            Ok(())
        }
        Value::Map(_) | Value::List(_) => {
            for (key, child) in value.entries() {
                check_key(&key)?;
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(out, &path, child)?;
            }
            Ok(())
        }
        scalar => {
            let _ = writeln!(out, "{prefix}={}", render(scalar));
            Ok(())
        }
    }
}

fn check_key(key: &str) -> ConvertResult<()> {
    let reserved = |c: char| matches!(c, '.' | '=' | '[' | ']' | '\n' | '\r');
    if key.is_empty()
        || key.trim() != key
        || key.contains(reserved)
        || key.starts_with(';')
        || key.starts_with('#')
    {
        return Err(ConvertError::unsupported(
            FORMAT,
            format!("key {key:?} cannot be written"),
        ));
    }
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) => quote(s),
        _ => String::new(),
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('"' | '\\')) => out.push(c),
            Some(c) => return Err(format!("unknown escape \\{c}")),
            None => return Err("dangling escape".to_owned()),
        }
    }
    Ok(out)
}

fn parse_value(raw: &str) -> Result<Value, String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let body = rest
            .strip_suffix('"')
            .filter(|body| !body.ends_with('\\') || body.ends_with("\\\\"))
            .ok_or_else(|| "unterminated string".to_owned())?;
        return unquote(body).map(Value::String);
    }
    Ok(match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "{}" => Value::map(),
        "[]" => Value::list(),
        _ => parse_bare(raw),
    })
}

fn parse_bare(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        if i.to_string() == raw {
            return Value::Integer(i);
        }
    }
    if raw.contains(['.', 'e', 'E']) {
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
    }
    Value::String(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write(value: &Value) -> String {
        let mut meta = ConverterMeta::new(FORMAT);
        String::from_utf8(IniConverter.serialize(value, &mut meta).unwrap()).unwrap()
    }

    fn read(text: &str) -> Value {
        let mut meta = ConverterMeta::new(FORMAT);
        IniConverter.unserialize(text.as_bytes(), &mut meta).unwrap()
    }

    #[test]
    fn flattens_to_dotted_keys() {
        let value = Value::from(json!({
            "server": {"host": "localhost", "ports": [80, 443]},
            "debug": true,
            "ratio": 0.5,
            "nothing": null,
            "empty": {}
        }));
        assert_eq!(
            write(&value),
            "server.host=\"localhost\"\nserver.ports.0=80\nserver.ports.1=443\n\
             debug=true\nratio=0.5\nnothing=null\nempty={}\n"
        );
    }

    #[test]
    fn reads_back_written_output() {
        let value = Value::from(json!({
            "a": {"b": ["x", {"c": 1.0}], "s": "quote \" and \\ and\nnewline"},
            "n": -3,
            "l": []
        }));
        assert_eq!(read(&write(&value)), value);
    }

    #[test]
    fn sections_prefix_keys() {
        let value = read("; comment\nroot=1\n[db]\nhost = \"h\"\nport = 5432\n[db.pool]\nsize=4\n");
        assert_eq!(
            value.to_json(),
            json!({"root": 1, "db": {"host": "h", "port": 5432, "pool": {"size": 4}}})
        );
    }

    #[test]
    fn index_keyed_maps_read_as_lists() {
        let value = Value::from(json!({"m": {"0": "a", "1": "b"}}));
        let text = write(&value);
        assert_eq!(text, "m.0=\"a\"\nm.1=\"b\"\n");
        assert_eq!(read(&text).to_json(), json!({"m": ["a", "b"]}));
    }

    #[test]
    fn bare_words_stay_strings() {
        let value = read("a=hello world\nb=007\nc=1e3\n");
        assert_eq!(value.to_json(), json!({"a": "hello world", "b": "007", "c": 1000.0}));
    }

    #[test]
    fn malformed_lines_are_errors() {
        let mut meta = ConverterMeta::new(FORMAT);
        assert!(IniConverter.unserialize(b"just words\n", &mut meta).is_err());
        assert!(IniConverter.unserialize(b"[open\n", &mut meta).is_err());
        assert!(IniConverter.unserialize(b"a=\"open\n", &mut meta).is_err());
    }

    #[test]
    fn scalar_top_level_is_unsupported() {
        let mut meta = ConverterMeta::new(FORMAT);
        let err = IniConverter.serialize(&Value::from(1), &mut meta).unwrap_err();
        assert!(matches!(err, ConvertError::Unsupported { .. }));
    }

    #[test]
    fn dotted_keys_cannot_be_written() {
        let mut meta = ConverterMeta::new(FORMAT);
        let value = Value::from(json!({"a.b": 1}));
        assert!(IniConverter.serialize(&value, &mut meta).is_err());
    }
}
