//! SQL LIKE pattern matching

use super::traits::BinaryOperator;
use crate::error::{Error, Result};
use crate::types::{DataType, Value};
use regex::Regex;

/// Translates a LIKE pattern to an anchored regex: `%` matches any run of
/// characters, `_` matches exactly one, and `\` escapes the next character.
fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => regex.push_str(&regex::escape(&escaped.to_string())),
                None => {
                    return Err(Error::ExecutionError(
                        "LIKE pattern ends with a bare escape".into(),
                    ));
                }
            },
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex)
        .map_err(|e| Error::ExecutionError(format!("Invalid LIKE pattern: {}", e)))
}

pub struct LikeOperator;

impl BinaryOperator for LikeOperator {
    fn name(&self) -> &'static str {
        "like"
    }

    fn symbol(&self) -> &'static str {
        "LIKE"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        for t in [left, right] {
            if !t.is_textual() && *t != DataType::Null {
                return Err(Error::TypeMismatch {
                    expected: "textual operands for LIKE".into(),
                    found: t.to_string(),
                });
            }
        }
        Ok(DataType::Boolean)
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }
        let (Some(text), Some(pattern)) = (left.as_text(), right.as_text()) else {
            return Err(Error::TypeMismatch {
                expected: "textual operands for LIKE".into(),
                found: format!("{} and {}", left.data_type(), right.data_type()),
            });
        };
        Ok(Value::Boolean(pattern_to_regex(pattern)?.is_match(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(text: &str, pattern: &str) -> Value {
        LikeOperator
            .execute(Value::text(text), Value::text(pattern))
            .unwrap()
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(like("laptop pro", "laptop%"), Value::Boolean(true));
        assert_eq!(like("laptop", "lap_op"), Value::Boolean(true));
        assert_eq!(like("laptop", "desk%"), Value::Boolean(false));
    }

    #[test]
    fn test_pattern_is_anchored() {
        assert_eq!(like("a laptop", "laptop"), Value::Boolean(false));
        assert_eq!(like("laptop", "laptop"), Value::Boolean(true));
    }

    #[test]
    fn test_escape_and_metacharacters() {
        assert_eq!(like("100%", "100\\%"), Value::Boolean(true));
        assert_eq!(like("1000", "100\\%"), Value::Boolean(false));
        // Regex metacharacters in the pattern are literal
        assert_eq!(like("a.b", "a.b"), Value::Boolean(true));
        assert_eq!(like("axb", "a.b"), Value::Boolean(false));
    }

    #[test]
    fn test_null_operand() {
        assert_eq!(
            LikeOperator.execute(Value::Null, Value::text("%")),
            Ok(Value::Null)
        );
    }
}
