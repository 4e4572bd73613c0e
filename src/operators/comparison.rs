//! Comparison operators and the total-order comparison
//!
//! The comparison operators follow three-valued logic: a null operand makes
//! the result null (unknown), and a filter later treats unknown as false.
//! `compare` is different: it is the total order used by sorting, MIN/MAX,
//! and ranking, where null must land somewhere, so it orders null before
//! every non-null value.

use super::traits::BinaryOperator;
use crate::error::{Error, Result};
use crate::types::{DataType, Value};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Total-order comparison between two values of comparable types.
///
/// Null compares equal to null and before everything else. Integers and
/// decimals compare numerically across variants; text and enumerated text
/// compare by content. Incomparable types are a `TypeMismatch`.
pub fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
        (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
        (Value::Decimal(a), Value::Decimal(b)) => Ok(a.cmp(b)),
        (Value::Integer(a), Value::Decimal(b)) => Ok(Decimal::from(*a).cmp(b)),
        (Value::Decimal(a), Value::Integer(b)) => Ok(a.cmp(&Decimal::from(*b))),
        (Value::Text(a) | Value::Enum(a), Value::Text(b) | Value::Enum(b)) => Ok(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
        _ => Err(Error::TypeMismatch {
            expected: left.data_type().to_string(),
            found: right.data_type().to_string(),
        }),
    }
}

/// Compares two key tuples position by position.
pub fn compare_composite(left: &[Value], right: &[Value]) -> Result<Ordering> {
    for (l, r) in left.iter().zip(right.iter()) {
        match compare(l, r)? {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(left.len().cmp(&right.len()))
}

fn validate_comparable(symbol: &str, left: &DataType, right: &DataType) -> Result<DataType> {
    let comparable = *left == DataType::Null
        || *right == DataType::Null
        || left == right
        || (left.is_numeric() && right.is_numeric())
        || (left.is_textual() && right.is_textual());
    if comparable {
        Ok(DataType::Boolean)
    } else {
        Err(Error::TypeMismatch {
            expected: format!("comparable operands for {}", symbol),
            found: format!("{} and {}", left, right),
        })
    }
}

fn execute_comparison(
    left: Value,
    right: Value,
    test: impl Fn(Ordering) -> bool,
) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Boolean(test(compare(&left, &right)?)))
}

macro_rules! comparison_operator {
    ($struct_name:ident, $name:literal, $symbol:literal, $test:expr) => {
        pub struct $struct_name;

        impl BinaryOperator for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn symbol(&self) -> &'static str {
                $symbol
            }

            fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
                validate_comparable($symbol, left, right)
            }

            fn execute(&self, left: Value, right: Value) -> Result<Value> {
                execute_comparison(left, right, $test)
            }
        }
    };
}

comparison_operator!(EqualOperator, "equal", "=", |o| o == Ordering::Equal);
comparison_operator!(NotEqualOperator, "not_equal", "<>", |o| o != Ordering::Equal);
comparison_operator!(LessThanOperator, "less_than", "<", |o| o == Ordering::Less);
comparison_operator!(LessThanOrEqualOperator, "less_than_or_equal", "<=", |o| o
    != Ordering::Greater);
comparison_operator!(GreaterThanOperator, "greater_than", ">", |o| o == Ordering::Greater);
comparison_operator!(GreaterThanOrEqualOperator, "greater_than_or_equal", ">=", |o| o
    != Ordering::Less);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_comparison_is_unknown() {
        assert_eq!(
            EqualOperator.execute(Value::Null, Value::Null),
            Ok(Value::Null)
        );
        assert_eq!(
            LessThanOperator.execute(Value::Integer(1), Value::Null),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_cross_numeric_comparison() {
        assert_eq!(
            LessThanOperator.execute(Value::Integer(2), Value::Decimal(Decimal::new(25, 1))),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_text_enum_comparable() {
        assert_eq!(
            EqualOperator.execute(Value::Enum("USA".into()), Value::text("USA")),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_incomparable_types() {
        assert!(compare(&Value::Integer(1), &Value::text("1")).is_err());
        assert!(
            EqualOperator
                .validate(&DataType::Date, &DataType::Integer)
                .is_err()
        );
    }

    #[test]
    fn test_total_order_nulls_first() {
        assert_eq!(compare(&Value::Null, &Value::Integer(0)), Ok(Ordering::Less));
        assert_eq!(compare(&Value::Null, &Value::Null), Ok(Ordering::Equal));
    }

    #[test]
    fn test_compare_composite() {
        let a = vec![Value::Integer(1), Value::text("b")];
        let b = vec![Value::Integer(1), Value::text("c")];
        assert_eq!(compare_composite(&a, &b), Ok(Ordering::Less));
        assert_eq!(compare_composite(&a, &a), Ok(Ordering::Equal));
    }
}
