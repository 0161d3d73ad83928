//! Type coercion for `!type` suffixes and typed getters
//!
//! Every function returns `None` when the value is not accepted; callers fall
//! back to their default. Nothing here can fail loudly.

use arbor_collection::{as_number, Callable, Map, Number, Value};
use arbor_path::TypeHint;

/// Coerce `value` according to `hint`
#[must_use]
pub fn coerce(value: &Value, hint: &TypeHint) -> Option<Value> {
    match hint {
        TypeHint::String => to_string(value).map(Value::String),
        TypeHint::Number => to_number(value).map(Value::from),
        TypeHint::Integer => to_integer(value).map(Value::Integer),
        TypeHint::Float => to_float(value).map(Value::Float),
        TypeHint::Boolean => to_boolean(value).map(Value::Bool),
        TypeHint::Array => to_array(value),
        TypeHint::Object => to_object(value).map(Value::Map),
        TypeHint::Callable => to_callable(value).map(Value::Callable),
        TypeHint::Unknown(_) => None,
    }
}

/// Strings, numbers and null (`""`)
#[must_use]
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) if f.is_finite() => Some(f.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Numbers and numeric text
#[inline]
#[must_use]
pub fn to_number(value: &Value) -> Option<Number> {
    as_number(value)
}

/// Integral numbers only; `"12.5"` is rejected rather than truncated
#[inline]
#[must_use]
pub fn to_integer(value: &Value) -> Option<i64> {
    as_number(value).and_then(Number::as_integral)
}

#[inline]
#[must_use]
pub fn to_float(value: &Value) -> Option<f64> {
    as_number(value).map(Number::as_f64)
}

/// `true`, `false`, `1`, `0`, `"1"`, `"0"` and nothing else
#[must_use]
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        Value::String(s) if s == "0" => Some(false),
        Value::String(s) if s == "1" => Some(true),
        _ => None,
    }
}

/// Any composite, shape preserved
#[must_use]
pub fn to_array(value: &Value) -> Option<Value> {
    value.is_composite().then(|| value.clone())
}

/// Any composite as a keyed map
#[must_use]
pub fn to_object(value: &Value) -> Option<Map> {
    if value.is_composite() {
        value.clone().into_map()
    } else {
        None
    }
}

#[must_use]
pub fn to_callable(value: &Value) -> Option<Callable> {
    match value {
        Value::Callable(f) => Some(f.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings() {
        assert_eq!(to_string(&Value::from(12)), Some("12".into()));
        assert_eq!(to_string(&Value::from(1.5)), Some("1.5".into()));
        assert_eq!(to_string(&Value::Null), Some(String::new()));
        assert_eq!(to_string(&Value::Bool(true)), None);
        assert_eq!(to_string(&Value::list()), None);
    }

    #[test]
    fn numbers() {
        assert_eq!(to_number(&Value::from("3")), Some(Number::Integer(3)));
        assert_eq!(to_number(&Value::from("3,25")), Some(Number::Float(3.25)));
        assert_eq!(to_number(&Value::from("three")), None);
        assert_eq!(to_number(&Value::Bool(true)), None);
    }

    #[test]
    fn integers_reject_fractions() {
        assert_eq!(to_integer(&Value::from("12")), Some(12));
        assert_eq!(to_integer(&Value::from(4.0)), Some(4));
        assert_eq!(to_integer(&Value::from("12.5")), None);
        assert_eq!(to_integer(&Value::from(12.5)), None);
    }

    #[test]
    fn floats() {
        assert_eq!(to_float(&Value::from(2)), Some(2.0));
        assert_eq!(to_float(&Value::from("0,5")), Some(0.5));
    }

    #[test]
    fn booleans_are_strict() {
        assert_eq!(to_boolean(&Value::from("1")), Some(true));
        assert_eq!(to_boolean(&Value::from(0)), Some(false));
        assert_eq!(to_boolean(&Value::from("2")), None);
        assert_eq!(to_boolean(&Value::from("true")), None);
        assert_eq!(to_boolean(&Value::from(1.0)), None);
    }

    #[test]
    fn composites() {
        let list = Value::from(json!(["a", "b"]));
        assert_eq!(to_array(&list), Some(list.clone()));
        let map = to_object(&list).unwrap();
        assert_eq!(map.get("1"), Some(&Value::from("b")));
        assert_eq!(to_array(&Value::from("x")), None);
        assert_eq!(to_object(&Value::from(1)), None);
    }

    #[test]
    fn unknown_hint_rejects_everything() {
        let hint = TypeHint::Unknown("date".into());
        assert_eq!(coerce(&Value::from("2024-01-01"), &hint), None);
    }
}
