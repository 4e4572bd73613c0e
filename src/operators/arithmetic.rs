//! Arithmetic operators
//!
//! Integer arithmetic is checked (overflow is an execution error, not a
//! wrap). Any decimal operand promotes the whole operation to decimal, and
//! division always produces a decimal so that 7 / 2 = 3.5. Division by zero
//! or by null yields null rather than an error.

use super::traits::{BinaryOperator, UnaryOperator};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};
use rust_decimal::Decimal;

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(i) => Some(Decimal::from(*i)),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

fn type_mismatch(op: &str, left: &Value, right: &Value) -> Error {
    Error::TypeMismatch {
        expected: format!("numeric operands for {}", op),
        found: format!("{} and {}", left.data_type(), right.data_type()),
    }
}

/// Shared validation for `+`, `-` and `*`: integer stays integer, any
/// decimal operand promotes to decimal.
fn validate_numeric(op: &str, left: &DataType, right: &DataType) -> Result<DataType> {
    if *left == DataType::Null || *right == DataType::Null {
        return Ok(DataType::Null);
    }
    if !left.is_numeric() || !right.is_numeric() {
        return Err(Error::TypeMismatch {
            expected: format!("numeric operands for {}", op),
            found: format!("{} and {}", left, right),
        });
    }
    if *left == DataType::Integer && *right == DataType::Integer {
        Ok(DataType::Integer)
    } else {
        Ok(DataType::Decimal)
    }
}

fn execute_numeric(
    op: &str,
    left: Value,
    right: Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    dec_op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
) -> Result<Value> {
    match (&left, &right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Integer(a), Value::Integer(b)) => int_op(*a, *b)
            .map(Value::Integer)
            .ok_or_else(|| Error::ExecutionError(format!("Integer overflow in {}", op))),
        _ => {
            let (Some(a), Some(b)) = (to_decimal(&left), to_decimal(&right)) else {
                return Err(type_mismatch(op, &left, &right));
            };
            dec_op(a, b)
                .map(Value::Decimal)
                .ok_or_else(|| Error::ExecutionError(format!("Decimal overflow in {}", op)))
        }
    }
}

pub struct AddOperator;

impl BinaryOperator for AddOperator {
    fn name(&self) -> &'static str {
        "add"
    }

    fn symbol(&self) -> &'static str {
        "+"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        validate_numeric(self.symbol(), left, right)
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        execute_numeric(self.symbol(), left, right, i64::checked_add, |a, b| {
            a.checked_add(b)
        })
    }
}

pub struct SubtractOperator;

impl BinaryOperator for SubtractOperator {
    fn name(&self) -> &'static str {
        "subtract"
    }

    fn symbol(&self) -> &'static str {
        "-"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        validate_numeric(self.symbol(), left, right)
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        execute_numeric(self.symbol(), left, right, i64::checked_sub, |a, b| {
            a.checked_sub(b)
        })
    }
}

pub struct MultiplyOperator;

impl BinaryOperator for MultiplyOperator {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn symbol(&self) -> &'static str {
        "*"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        validate_numeric(self.symbol(), left, right)
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        execute_numeric(self.symbol(), left, right, i64::checked_mul, |a, b| {
            a.checked_mul(b)
        })
    }
}

pub struct DivideOperator;

impl BinaryOperator for DivideOperator {
    fn name(&self) -> &'static str {
        "divide"
    }

    fn symbol(&self) -> &'static str {
        "/"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        if *left == DataType::Null || *right == DataType::Null {
            return Ok(DataType::Null);
        }
        validate_numeric(self.symbol(), left, right)?;
        // Division always produces a decimal, even integer / integer
        Ok(DataType::Decimal)
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }
        let (Some(a), Some(b)) = (to_decimal(&left), to_decimal(&right)) else {
            return Err(type_mismatch(self.symbol(), &left, &right));
        };
        // Division by zero is null, never an error
        match a.checked_div(b) {
            Some(d) => Ok(Value::Decimal(d)),
            None => Ok(Value::Null),
        }
    }
}

pub struct NegateOperator;

impl UnaryOperator for NegateOperator {
    fn name(&self) -> &'static str {
        "negate"
    }

    fn symbol(&self) -> &'static str {
        "-"
    }

    fn validate(&self, operand: &DataType) -> Result<DataType> {
        if *operand == DataType::Null {
            return Ok(DataType::Null);
        }
        if operand.is_numeric() {
            Ok(*operand)
        } else {
            Err(Error::TypeMismatch {
                expected: "numeric operand for -".into(),
                found: operand.to_string(),
            })
        }
    }

    fn execute(&self, operand: Value) -> Result<Value> {
        match operand {
            Value::Null => Ok(Value::Null),
            Value::Integer(i) => i
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| Error::ExecutionError("Integer overflow in -".into())),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            other => Err(Error::TypeMismatch {
                expected: "numeric operand for -".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(
            AddOperator.execute(Value::Integer(2), Value::Integer(3)),
            Ok(Value::Integer(5))
        );
        assert!(
            AddOperator
                .execute(Value::Integer(i64::MAX), Value::Integer(1))
                .is_err()
        );
    }

    #[test]
    fn test_decimal_promotion() {
        let result = MultiplyOperator
            .execute(Value::Integer(3), Value::Decimal(Decimal::new(25, 1)))
            .unwrap();
        assert_eq!(result, Value::Decimal(Decimal::new(75, 1)));
    }

    #[test]
    fn test_division_is_decimal() {
        let result = DivideOperator
            .execute(Value::Integer(7), Value::Integer(2))
            .unwrap();
        assert_eq!(result, Value::Decimal(Decimal::new(35, 1)));
    }

    #[test]
    fn test_division_by_zero_is_null() {
        assert_eq!(
            DivideOperator.execute(Value::Integer(1), Value::Integer(0)),
            Ok(Value::Null)
        );
        assert_eq!(
            DivideOperator.execute(Value::Integer(1), Value::Null),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(
            SubtractOperator.execute(Value::Null, Value::Integer(1)),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_text_operand_rejected() {
        assert!(
            AddOperator
                .execute(Value::text("a"), Value::Integer(1))
                .is_err()
        );
        assert!(
            AddOperator
                .validate(&DataType::Text, &DataType::Integer)
                .is_err()
        );
    }
}
