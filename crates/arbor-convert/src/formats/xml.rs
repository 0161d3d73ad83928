//! XML converter
//!
//! Maps element trees to nested values:
//!
//! - the document element becomes the namespace value; its name is kept in
//!   the metadata (`root`) and reused on write
//! - repeated sibling elements become lists
//! - attributes become keys, and their dotted paths are recorded (`attributes`)
//!   so they are written back as attributes
//! - self-closing elements are empty maps, `<k></k>` is the empty string
//! - `TRUE`, `FALSE` and `NULL` text are booleans and null; canonical
//!   numbers are numbers; everything else is text
//!
//! Paths of lists are recorded too (`lists`), which keeps single-item and
//! empty lists intact when the same metadata is used for the next read.

use crate::error::{utf8, ConvertError, ConvertResult};
use crate::formats::Converter;
use crate::meta::ConverterMeta;
use arbor_collection::{Map, Value};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt::Write as _;

const FORMAT: &str = "xml";
const DEFAULT_ROOT: &str = "root";
const DEFAULT_VERSION: &str = "1.0";
const DEFAULT_ENCODING: &str = "UTF-8";

/// Metadata key listing attribute paths
pub const ATTRIBUTES_KEY: &str = "attributes";
/// Metadata key listing list paths
pub const LISTS_KEY: &str = "lists";
const VERSION_KEY: &str = "version";
const ENCODING_KEY: &str = "encoding";

/// XML converter
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlConverter;

impl XmlConverter {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for XmlConverter {
    fn format(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn serialize(&self, value: &Value, meta: &mut ConverterMeta) -> ConvertResult<Vec<u8>> {
        let root = meta.root().unwrap_or(DEFAULT_ROOT).to_owned();
        check_name(&root)?;
        let version = meta.get_str(VERSION_KEY).unwrap_or(DEFAULT_VERSION).to_owned();
        let encoding = meta.get_str(ENCODING_KEY).unwrap_or(DEFAULT_ENCODING).to_owned();

        let mut writer = Writer {
            out: format!(
                "<?xml version=\"{}\" encoding=\"{}\"?>\n",
                escape(&version),
                escape(&encoding)
            ),
            attributes: meta.paths(ATTRIBUTES_KEY).into_iter().collect(),
            lists: Vec::new(),
        };
        if matches!(value, Value::List(_)) {
            return Err(ConvertError::unsupported(FORMAT, "document element cannot be a list"));
        }
        writer.element(&root, value, "", 0)?;

        meta.set(crate::meta::ROOT_KEY, Value::String(root));
        meta.set_paths(LISTS_KEY, writer.lists);
        Ok(writer.out.into_bytes())
    }

    fn unserialize(&self, bytes: &[u8], meta: &mut ConverterMeta) -> ConvertResult<Value> {
        let text = utf8(FORMAT, bytes)?;
        if text.trim().is_empty() {
            return Ok(Value::map());
        }

        let mut parser = Parser::new(text);
        let declaration = parser.prolog()?;
        let element = parser.element()?;
        parser.epilog()?;

        for (key, value) in declaration {
            if key == VERSION_KEY || key == ENCODING_KEY {
                meta.set(key, Value::String(value));
            }
        }

        let mut reader = Reader {
            list_hints: meta.paths(LISTS_KEY).into_iter().collect(),
            attributes: Vec::new(),
            lists: Vec::new(),
        };
        let value = reader.value(&element, "");
        meta.set(crate::meta::ROOT_KEY, Value::String(element.name));
        meta.set_paths(ATTRIBUTES_KEY, reader.attributes);
        meta.set_paths(LISTS_KEY, reader.lists);
        Ok(value)
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn check_name(name: &str) -> ConvertResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start)
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ConvertError::unsupported(
            FORMAT,
            format!("{name:?} is not a valid element name"),
        ))
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn decode_scalar(text: &str) -> Value {
    match text {
        "TRUE" => return Value::Bool(true),
        "FALSE" => return Value::Bool(false),
        "NULL" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        if i.to_string() == text {
            return Value::Integer(i);
        }
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() && format!("{f:?}") == text {
            return Value::Float(f);
        }
    }
    Value::String(text.to_owned())
}

struct Writer {
    out: String,
    attributes: HashSet<String>,
    lists: Vec<String>,
}

impl Writer {
    fn element(&mut self, name: &str, value: &Value, path: &str, depth: usize) -> ConvertResult<()> {
        let indent = "  ".repeat(depth);
        let Value::Map(map) = value else {
            if matches!(value, Value::List(_)) {
                return Err(ConvertError::unsupported(
                    FORMAT,
                    format!("nested list at {path:?}"),
                ));
            }
            let _ = writeln!(self.out, "{indent}<{name}>{}</{name}>", escape(&render(value)));
            return Ok(());
        };

        let mut attrs = String::new();
        let mut children = Vec::new();
        for (key, child) in map {
            if matches!(child, Value::Callable(_)) {
                continue;
            }
            check_name(key)?;
            let child_path = join(path, key);
            if !child.is_composite() && self.attributes.contains(&child_path) {
                let _ = write!(attrs, " {key}=\"{}\"", escape(&render(child)));
            } else {
                children.push((key, child, child_path));
            }
        }

        // Empty lists produce no elements
        let (empty_lists, children): (Vec<_>, Vec<_>) = children
            .into_iter()
            .partition(|(_, child, _)| matches!(child, Value::List(items) if items.is_empty()));
        self.lists.extend(empty_lists.into_iter().map(|(_, _, path)| path));

        if children.is_empty() {
            let _ = writeln!(self.out, "{indent}<{name}{attrs}/>");
            return Ok(());
        }
        let _ = writeln!(self.out, "{indent}<{name}{attrs}>");
        for (key, child, child_path) in children {
            match child {
                Value::List(items) => {
                    for item in items.iter().filter(|v| !matches!(v, Value::Callable(_))) {
                        self.element(key, item, &child_path, depth + 1)?;
                    }
                    self.lists.push(child_path);
                }
                _ => self.element(key, child, &child_path, depth + 1)?,
            }
        }
        let _ = writeln!(self.out, "{indent}</{name}>");
        Ok(())
    }
}

/// Parsed element
#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
    self_closing: bool,
}

struct Reader {
    list_hints: HashSet<String>,
    attributes: Vec<String>,
    lists: Vec<String>,
}

impl Reader {
    /// Hinted list paths directly below `path`, as (key, path) pairs
    fn hinted_lists(&self, path: &str) -> Vec<(String, String)> {
        self.list_hints
            .iter()
            .filter_map(|hint| {
                let (parent, key) = hint.rsplit_once('.').unwrap_or(("", hint.as_str()));
                (parent == path).then(|| (key.to_owned(), hint.clone()))
            })
            .collect()
    }

    fn value(&mut self, element: &Element, path: &str) -> Value {
        let hinted = self.hinted_lists(path);
        if element.attributes.is_empty() && element.children.is_empty() && hinted.is_empty() {
            return if element.self_closing {
                Value::map()
            } else {
                decode_scalar(&element.text)
            };
        }

        let mut map = Map::new();
        for (key, raw) in &element.attributes {
            let attr_path = join(path, key);
            map.insert(key.clone(), decode_scalar(raw));
            self.attributes.push(attr_path);
        }

        let mut groups: IndexMap<&str, Vec<&Element>> = IndexMap::new();
        for child in &element.children {
            groups.entry(child.name.as_str()).or_default().push(child);
        }
        for (name, group) in groups {
            let child_path = join(path, name);
            let value = if group.len() > 1 || self.list_hints.contains(&child_path) {
                self.lists.push(child_path.clone());
                Value::List(group.into_iter().map(|el| self.value(el, &child_path)).collect())
            } else {
                self.value(group[0], &child_path)
            };
            map.insert(name.to_owned(), value);
        }

        // Hinted lists with no elements left are empty lists
        for (key, hint) in hinted {
            if !map.contains_key(&key) {
                map.insert(key, Value::list());
                self.lists.push(hint);
            }
        }

        Value::Map(map)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, message: &str) -> ConvertError {
        ConvertError::syntax(FORMAT, format!("{message} at byte {}", self.pos))
    }

    fn at(&self, token: &str) -> bool {
        self.rest().starts_with(token)
    }

    fn expect(&mut self, token: &str) -> ConvertResult<()> {
        if self.at(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(&format!("expected {token:?}")))
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume through `end`, returning the text before it
    fn until(&mut self, end: &str) -> ConvertResult<&'a str> {
        let rest = self.rest();
        let found = rest
            .find(end)
            .ok_or_else(|| self.error(&format!("unterminated construct, expected {end:?}")))?;
        self.pos += found + end.len();
        Ok(&rest[..found])
    }

    fn name(&mut self) -> ConvertResult<String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if is_name_start(c) => {}
            _ => return Err(self.error("expected a name")),
        }
        let end = chars
            .find(|(_, c)| !is_name_char(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Ok(rest[..end].to_owned())
    }

    /// Skip comments, processing instructions and doctype declarations
    fn skip_misc(&mut self) -> ConvertResult<()> {
        loop {
            self.skip_whitespace();
            if self.at("<!--") {
                self.until("-->")?;
            } else if self.at("<?") {
                self.until("?>")?;
            } else if self.at("<!DOCTYPE") {
                self.until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    /// XML declaration pseudo-attributes, then any misc content
    fn prolog(&mut self) -> ConvertResult<Vec<(String, String)>> {
        self.skip_whitespace();
        let mut declaration = Vec::new();
        if self.at("<?xml") && self.rest()[5..].starts_with(char::is_whitespace) {
            self.pos += 5;
            loop {
                self.skip_whitespace();
                if self.at("?>") {
                    self.pos += 2;
                    break;
                }
                let key = self.name()?;
                let value = self.attribute_value()?;
                declaration.push((key, value));
            }
        }
        self.skip_misc()?;
        Ok(declaration)
    }

    fn epilog(&mut self) -> ConvertResult<()> {
        self.skip_misc()?;
        if self.pos < self.src.len() {
            return Err(self.error("content after document element"));
        }
        Ok(())
    }

    fn attribute_value(&mut self) -> ConvertResult<String> {
        self.skip_whitespace();
        self.expect("=")?;
        self.skip_whitespace();
        let quote = if self.at("\"") {
            "\""
        } else if self.at("'") {
            "'"
        } else {
            return Err(self.error("expected quoted attribute value"));
        };
        self.pos += 1;
        let raw = self.until(quote)?;
        self.unescape(raw)
    }

    fn element(&mut self) -> ConvertResult<Element> {
        self.expect("<")?;
        let name = self.name()?;
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            if self.at("/>") {
                self.pos += 2;
                return Ok(Element {
                    name,
                    attributes,
                    children: Vec::new(),
                    text: String::new(),
                    self_closing: true,
                });
            }
            if self.at(">") {
                self.pos += 1;
                break;
            }
            let key = self.name()?;
            let value = self.attribute_value()?;
            if attributes.iter().any(|(k, _)| *k == key) {
                return Err(self.error(&format!("duplicate attribute {key:?}")));
            }
            attributes.push((key, value));
        }

        let mut children = Vec::new();
        let mut text = String::new();
        loop {
            if self.pos >= self.src.len() {
                return Err(self.error(&format!("unclosed element <{name}>")));
            }
            if self.at("</") {
                self.pos += 2;
                let close = self.name()?;
                if close != name {
                    return Err(self.error(&format!("mismatched </{close}>, expected </{name}>")));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            } else if self.at("<!--") {
                self.until("-->")?;
            } else if self.at("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.until("]]>")?);
            } else if self.at("<?") {
                self.until("?>")?;
            } else if self.at("<") {
                children.push(self.element()?);
            } else {
                let rest = self.rest();
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                text.push_str(&self.unescape(&rest[..end])?);
            }
        }

        Ok(Element {
            name,
            attributes,
            children,
            text,
            self_closing: false,
        })
    }

    fn unescape(&self, raw: &str) -> ConvertResult<String> {
        if !raw.contains('&') {
            return Ok(raw.to_owned());
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('&') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find(';')
                .ok_or_else(|| self.error("unterminated entity reference"))?;
            let entity = &after[..end];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            let c = decoded.ok_or_else(|| self.error(&format!("unknown entity &{entity};")))?;
            out.push(c);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn read(xml: &str) -> (Value, ConverterMeta) {
        let mut meta = ConverterMeta::new(FORMAT);
        let value = XmlConverter.unserialize(xml.as_bytes(), &mut meta).unwrap();
        (value, meta)
    }

    fn write(value: &Value, meta: &mut ConverterMeta) -> String {
        String::from_utf8(XmlConverter.serialize(value, meta).unwrap()).unwrap()
    }

    #[test]
    fn reads_elements_attributes_and_lists() {
        let (value, meta) = read(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- settings -->
<config>
  <server host="localhost" port="8080">
    <alias>a</alias>
    <alias>b</alias>
  </server>
  <debug>TRUE</debug>
  <ratio>0.5</ratio>
  <empty/>
  <blank></blank>
  <zip>007</zip>
</config>"#,
        );
        assert_eq!(
            value.to_json(),
            json!({
                "server": {"host": "localhost", "port": 8080, "alias": ["a", "b"]},
                "debug": true,
                "ratio": 0.5,
                "empty": {},
                "blank": "",
                "zip": "007"
            })
        );
        assert_eq!(meta.root(), Some("config"));
        assert_eq!(meta.paths(ATTRIBUTES_KEY), vec!["server.host", "server.port"]);
        assert_eq!(meta.paths(LISTS_KEY), vec!["server.alias"]);
    }

    #[test]
    fn writes_back_attributes_and_root() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                      <config>\n  <item id=\"1\">\n    <name>x</name>\n  </item>\n</config>\n";
        let (value, mut meta) = read(source);
        assert_eq!(write(&value, &mut meta), source);
    }

    #[test]
    fn scalar_encoding() {
        let value = Value::from(json!({"t": true, "f": false, "n": null, "i": -4, "x": 1.0, "s": "a<b&c"}));
        let mut meta = ConverterMeta::new(FORMAT);
        let text = write(&value, &mut meta);
        assert!(text.contains("<t>TRUE</t>"));
        assert!(text.contains("<f>FALSE</f>"));
        assert!(text.contains("<n>NULL</n>"));
        assert!(text.contains("<x>1.0</x>"));
        assert!(text.contains("<s>a&lt;b&amp;c</s>"));
        assert!(text.contains("<root>"));

        let back = XmlConverter.unserialize(text.as_bytes(), &mut meta).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn list_hints_keep_short_lists() {
        let value = Value::from(json!({"one": ["only"], "none": [], "nested": {"xs": [{"k": 1}]}}));
        let mut meta = ConverterMeta::new(FORMAT);
        let text = write(&value, &mut meta);
        let back = XmlConverter.unserialize(text.as_bytes(), &mut meta).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn entities_and_cdata() {
        let (value, _) = read("<r><a>&lt;&#65;&#x42;&apos;</a><b><![CDATA[<raw> & stuff]]></b></r>");
        assert_eq!(value.to_json(), json!({"a": "<AB'", "b": "<raw> & stuff"}));
    }

    #[test]
    fn malformed_documents_are_errors() {
        let mut meta = ConverterMeta::new(FORMAT);
        for bad in ["<a><b></a>", "<a>", "<a></a><b/>", "<a x=1/>", "<a>&bogus;</a>", "text"] {
            let err = XmlConverter.unserialize(bad.as_bytes(), &mut meta).unwrap_err();
            assert!(matches!(err, ConvertError::Syntax { .. }), "{bad}");
        }
    }

    #[test]
    fn unrepresentable_values() {
        let mut meta = ConverterMeta::new(FORMAT);
        let nested = Value::from(json!({"a": [[1, 2]]}));
        assert!(XmlConverter.serialize(&nested, &mut meta).is_err());
        let bad_key = Value::from(json!({"1st": 1}));
        assert!(XmlConverter.serialize(&bad_key, &mut meta).is_err());
        assert!(XmlConverter.serialize(&Value::from(json!([1])), &mut meta).is_err());
    }
}
