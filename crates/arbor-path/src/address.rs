//! Address grammar and parsed form
//!
//! `address := [namespace ':'] key ['!' type]`, `key := segment (sep segment)*`

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between namespace and key
pub const NAMESPACE_SEPARATOR: char = ':';

/// Separator between key and type suffix
pub const TYPE_SEPARATOR: char = '!';

/// Default separator between key segments
pub const DEFAULT_KEY_SEPARATOR: char = '.';

/// Coercion requested through the `!type` suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHint {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Callable,
    /// Unrecognized type name, kept verbatim; coerces nothing
    Unknown(String),
}

impl TypeHint {
    /// Canonical suffix name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Callable => "callable",
            Self::Unknown(name) => name,
        }
    }
}

impl From<&str> for TypeHint {
    fn from(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "callable" => Self::Callable,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl Display for TypeHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed address
///
/// `tokens` is the traversal path from the container root: the namespace
/// (when present) followed by the key segments. `id` is the canonical,
/// type-free form used as cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedIndex {
    pub id: String,
    pub namespace: Option<String>,
    pub key: String,
    pub tokens: Vec<String>,
    pub kind: Option<TypeHint>,
}

impl ParsedIndex {
    /// Parse `address` against a default namespace and key separator
    ///
    /// Only the first `:` and the first `!` are significant. An explicit empty
    /// namespace (`":a.b"`) addresses the root. Empty key segments are
    /// dropped, so `"a..b."` and `"a.b"` yield the same `id`.
    #[must_use]
    pub fn parse(address: &str, default_namespace: Option<&str>, separator: char) -> Self {
        let (namespace, rest) = match address.split_once(NAMESPACE_SEPARATOR) {
            Some(("", rest)) => (None, rest),
            Some((ns, rest)) => (Some(ns.to_owned()), rest),
            None => (default_namespace.map(str::to_owned), address),
        };

        let (key_part, kind) = match rest.split_once(TYPE_SEPARATOR) {
            Some((key, kind)) => (key, Some(TypeHint::from(kind))),
            None => (rest, None),
        };

        let segments: Vec<String> = key_part
            .split(separator)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        let key = segments.join(&separator.to_string());

        let id = match &namespace {
            Some(ns) => format!("{ns}{NAMESPACE_SEPARATOR}{key}"),
            None => key.clone(),
        };

        let mut tokens = Vec::with_capacity(segments.len() + 1);
        tokens.extend(namespace.iter().cloned());
        tokens.extend(segments);

        Self {
            id,
            namespace,
            key,
            tokens,
            kind,
        }
    }

    /// True when the address names a whole namespace (or the root)
    #[inline]
    #[must_use]
    pub fn is_namespace_root(&self) -> bool {
        self.key.is_empty()
    }

    /// True for the container root itself (no namespace, empty key)
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First traversal token (namespace, or first key segment)
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Address of a direct child of this one
    #[must_use]
    pub fn child_address(&self, child: &str, separator: char) -> String {
        match (&self.namespace, self.key.is_empty()) {
            (Some(ns), true) => format!("{ns}{NAMESPACE_SEPARATOR}{child}"),
            (Some(ns), false) => {
                format!("{ns}{NAMESPACE_SEPARATOR}{}{separator}{child}", self.key)
            }
            (None, true) => format!("{NAMESPACE_SEPARATOR}{child}"),
            (None, false) => format!("{NAMESPACE_SEPARATOR}{}{separator}{child}", self.key),
        }
    }
}

impl Display for ParsedIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        if let Some(kind) = &self.kind {
            write!(f, "{TYPE_SEPARATOR}{kind}")?;
        }
        Ok(())
    }
}

impl FromStr for ParsedIndex {
    type Err = std::convert::Infallible;

    /// Parse without a default namespace using `.` between segments
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, None, DEFAULT_KEY_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(address: &str) -> ParsedIndex {
        ParsedIndex::parse(address, None, '.')
    }

    #[test]
    fn plain_key() {
        let idx = parse("a.b.c");
        assert_eq!(idx.id, "a.b.c");
        assert_eq!(idx.namespace, None);
        assert_eq!(idx.tokens, vec!["a", "b", "c"]);
        assert_eq!(idx.kind, None);
    }

    #[test]
    fn namespace_and_type() {
        let idx = parse("app:db.port!integer");
        assert_eq!(idx.id, "app:db.port");
        assert_eq!(idx.namespace.as_deref(), Some("app"));
        assert_eq!(idx.key, "db.port");
        assert_eq!(idx.tokens, vec!["app", "db", "port"]);
        assert_eq!(idx.kind, Some(TypeHint::Integer));
    }

    #[test]
    fn only_first_separators_count() {
        let idx = parse("ns:a:b.c!string!float");
        assert_eq!(idx.namespace.as_deref(), Some("ns"));
        assert_eq!(idx.tokens, vec!["ns", "a:b", "c"]);
        assert_eq!(idx.kind, Some(TypeHint::Unknown("string!float".into())));
    }

    #[test]
    fn empty_segments_collapse() {
        assert_eq!(parse("a..b.").id, parse("a.b").id);
        assert_eq!(parse(".a.b").tokens, vec!["a", "b"]);
    }

    #[test]
    fn default_namespace_applies_only_without_explicit_one() {
        let idx = ParsedIndex::parse("a.b", Some("main"), '.');
        assert_eq!(idx.id, "main:a.b");
        assert_eq!(idx.tokens, vec!["main", "a", "b"]);

        let idx = ParsedIndex::parse("other:a", Some("main"), '.');
        assert_eq!(idx.id, "other:a");

        let idx = ParsedIndex::parse(":a", Some("main"), '.');
        assert_eq!(idx.namespace, None);
        assert_eq!(idx.tokens, vec!["a"]);
    }

    #[test]
    fn roots() {
        let root = parse("");
        assert!(root.is_root());
        assert!(root.tokens.is_empty());

        let ns_root = parse("ns:");
        assert!(!ns_root.is_root());
        assert!(ns_root.is_namespace_root());
        assert_eq!(ns_root.tokens, vec!["ns"]);
        assert_eq!(ns_root.id, "ns:");
    }

    #[test]
    fn custom_separator() {
        let idx = ParsedIndex::parse("a/b//c", None, '/');
        assert_eq!(idx.key, "a/b/c");
        assert_eq!(idx.tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn child_addresses() {
        assert_eq!(parse("ns:").child_address("k", '.'), "ns:k");
        assert_eq!(parse("ns:a.b").child_address("k", '.'), "ns:a.b.k");
        assert_eq!(parse("a").child_address("k", '.'), ":a.k");
        assert_eq!(parse("").child_address("k", '.'), ":k");
    }

    #[test]
    fn display_round_trips_canonical_form() {
        let idx = parse("ns:a..b!float");
        assert_eq!(idx.to_string(), "ns:a.b!float");
    }
}
