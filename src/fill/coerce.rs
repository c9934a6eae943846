use std::borrow::Cow;

use serde_json::{Number, Value};

/// Canonical text of a scalar JSON value: strings as-is, integers in decimal,
/// floats in shortest form (`2.0` renders as `2`), booleans as `true`/`false`.
/// Arrays, objects and null have no scalar text.
pub fn canonical_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(number_text(n))),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_text(n: &Number) -> String {
    if n.is_f64() {
        // f64's Display never prints a trailing `.0` or an exponent
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    } else {
        n.to_string()
    }
}

/// The boolean spellings accepted for `bool` fields and defaults.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_render_without_float_noise() {
        assert_eq!(canonical_text(&json!(29)).as_deref(), Some("29"));
        assert_eq!(canonical_text(&json!(-4)).as_deref(), Some("-4"));
        assert_eq!(canonical_text(&json!(2.0)).as_deref(), Some("2"));
        assert_eq!(canonical_text(&json!(1.8)).as_deref(), Some("1.8"));
        assert_eq!(canonical_text(&json!(u64::MAX)).as_deref(), Some("18446744073709551615"));
    }

    #[test]
    fn containers_and_null_have_no_text() {
        assert!(canonical_text(&json!(null)).is_none());
        assert!(canonical_text(&json!([1])).is_none());
        assert!(canonical_text(&json!({"a": 1})).is_none());
        assert_eq!(canonical_text(&json!(true)).as_deref(), Some("true"));
    }

    #[test]
    fn bool_spellings() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(t), Some(true));
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(f), Some(false));
        }
        assert_eq!(parse_bool("yes"), None);
    }
}
