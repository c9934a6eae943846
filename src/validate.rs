//! `validate` tag evaluation for integer fields.
//!
//! The tag is a comma-separated list of `rule=bound` pairs. Pairs are read and
//! checked one at a time, left to right, so an earlier violation wins over a
//! later unknown rule.
use crate::error::{Bound, FillError, Result};

pub(crate) fn validate_int(field: &str, rules: Option<&str>, value: i64) -> Result<()> {
    let Some(rules) = rules.filter(|r| !r.is_empty()) else {
        return Ok(());
    };

    for entry in rules.split(',') {
        let malformed = |reason: String| FillError::MalformedRule {
            field: field.to_string(),
            entry: entry.to_string(),
            reason,
        };
        let Some((rule, bound)) = entry.split_once('=') else {
            return Err(malformed("expected rule=bound".to_string()));
        };
        let rule = rule.trim();
        let bound = bound
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed(format!("invalid rule value: {e}")))?;

        let violated = match rule {
            "min" if value < bound => Some(Bound::Min),
            "max" if value > bound => Some(Bound::Max),
            "min" | "max" => None,
            other => {
                return Err(FillError::UnsupportedRule {
                    field: field.to_string(),
                    rule: other.to_string(),
                });
            }
        };
        if let Some(rule) = violated {
            return Err(FillError::ValidationBound { field: field.to_string(), value, rule, bound });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE: Option<&str> = Some("min=18,max=65");

    #[test]
    fn values_inside_the_bounds_pass() {
        for v in [18, 30, 65] {
            assert_eq!(validate_int("age", AGE, v), Ok(()));
        }
        assert_eq!(validate_int("age", None, -1), Ok(()));
        assert_eq!(validate_int("age", Some(""), -1), Ok(()));
    }

    #[test]
    fn first_violated_bound_is_reported() {
        let err = validate_int("age", AGE, 17).unwrap_err();
        assert_eq!(err, FillError::ValidationBound { field: "age".into(), value: 17, rule: Bound::Min, bound: 18 });
        assert!(err.to_string().contains("value 17 is less than min 18"));

        let err = validate_int("age", AGE, 66).unwrap_err();
        assert!(err.to_string().contains("value 66 is greater than max 65"));
    }

    #[test]
    fn rules_run_in_declaration_order() {
        // the violation comes before the unknown rule is reached
        let err = validate_int("n", Some("min=10,even=1"), 3).unwrap_err();
        assert!(matches!(err, FillError::ValidationBound { rule: Bound::Min, .. }));

        let err = validate_int("n", Some("min=10,even=1"), 12).unwrap_err();
        assert_eq!(err, FillError::UnsupportedRule { field: "n".into(), rule: "even".into() });
        assert!(err.to_string().contains("unsupported validation rule: even"));
    }

    #[test]
    fn malformed_entries_are_errors() {
        assert!(matches!(validate_int("n", Some("min"), 1), Err(FillError::MalformedRule { .. })));
        assert!(matches!(validate_int("n", Some("min=1.5"), 1), Err(FillError::MalformedRule { .. })));
        assert!(matches!(validate_int("n", Some("min=1,"), 1), Err(FillError::MalformedRule { .. })));
    }
}
