//! Type predicates and numeric text handling

use crate::value::Value;

/// Numeric view of a value or numeric text
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Integer form, only when no fractional part would be lost
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn as_integral(self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(i),
            Self::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Some(f as i64)
            }
            Self::Float(_) => None,
        }
    }

    /// Arithmetic sum; integer overflow falls back to float
    #[must_use]
    pub fn sum(self, other: Self) -> Self {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a
                .checked_add(b)
                .map_or_else(|| Self::Float(self.as_f64() + other.as_f64()), Self::Integer),
            _ => Self::Float(self.as_f64() + other.as_f64()),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Self::Integer(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

/// Parse numeric text
///
/// Accepts optional sign, digits, one decimal separator (`.` or a single `,`)
/// and an exponent. Integral text without separator or exponent becomes
/// [`Number::Integer`]; everything else becomes [`Number::Float`].
#[must_use]
pub fn parse_numeric(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b',' | b'e' | b'E'))
    {
        return None;
    }

    let normalized;
    let text = match text.matches(',').count() {
        0 => text,
        1 if !text.contains('.') => {
            normalized = text.replace(',', ".");
            normalized.as_str()
        }
        _ => return None,
    };

    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::Integer(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Number::Float)
}

/// Numeric view of numbers and numeric text; booleans are not numeric
#[must_use]
pub fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Integer(i) => Some(Number::Integer(*i)),
        Value::Float(f) if f.is_finite() => Some(Number::Float(*f)),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

#[inline]
#[must_use]
pub fn is_numeric(value: &Value) -> bool {
    as_number(value).is_some()
}

#[inline]
#[must_use]
pub fn is_textual(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

/// Lists and maps
#[inline]
#[must_use]
pub fn is_enumerable(value: &Value) -> bool {
    value.is_composite()
}

#[inline]
#[must_use]
pub fn is_callable(value: &Value) -> bool {
    matches!(value, Value::Callable(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text() {
        assert_eq!(parse_numeric("12"), Some(Number::Integer(12)));
        assert_eq!(parse_numeric(" -7 "), Some(Number::Integer(-7)));
        assert_eq!(parse_numeric("12.5"), Some(Number::Float(12.5)));
        assert_eq!(parse_numeric("12,5"), Some(Number::Float(12.5)));
        assert_eq!(parse_numeric("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_numeric("1,000.5"), None);
        assert_eq!(parse_numeric("1,2,3"), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("-"), None);
    }

    #[test]
    fn integral_view() {
        assert_eq!(Number::Float(3.0).as_integral(), Some(3));
        assert_eq!(Number::Float(12.5).as_integral(), None);
        assert_eq!(Number::Integer(4).as_integral(), Some(4));
    }

    #[test]
    fn sum_promotes_on_overflow() {
        assert_eq!(Number::Integer(2).sum(Number::Integer(2)), Number::Integer(4));
        assert_eq!(Number::Integer(1).sum(Number::Float(0.5)), Number::Float(1.5));
        assert!(matches!(Number::Integer(i64::MAX).sum(Number::Integer(1)), Number::Float(_)));
    }

    #[test]
    fn predicates() {
        assert!(is_numeric(&Value::from("3,5")));
        assert!(!is_numeric(&Value::Bool(true)));
        assert!(is_textual(&Value::from("")));
        assert!(is_enumerable(&Value::list()));
        assert!(!is_enumerable(&Value::from("a")));
    }
}
