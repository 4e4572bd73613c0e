//! Boolean connectives with three-valued truth tables
//!
//! Unknown (null) short-circuits the usual way: `null AND false` is false
//! because the result cannot depend on the unknown operand, while
//! `null AND true` stays unknown.

use super::traits::{BinaryOperator, UnaryOperator};
use crate::error::{Error, Result};
use crate::types::{DataType, Value};

fn validate_boolean(symbol: &str, types: &[&DataType]) -> Result<DataType> {
    for t in types {
        if **t != DataType::Boolean && **t != DataType::Null {
            return Err(Error::TypeMismatch {
                expected: format!("boolean operands for {}", symbol),
                found: t.to_string(),
            });
        }
    }
    Ok(DataType::Boolean)
}

fn as_truth(symbol: &str, value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(Error::TypeMismatch {
            expected: format!("boolean operands for {}", symbol),
            found: other.data_type().to_string(),
        }),
    }
}

pub struct AndOperator;

impl BinaryOperator for AndOperator {
    fn name(&self) -> &'static str {
        "and"
    }

    fn symbol(&self) -> &'static str {
        "AND"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        validate_boolean(self.symbol(), &[left, right])
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        let l = as_truth(self.symbol(), &left)?;
        let r = as_truth(self.symbol(), &right)?;
        Ok(match (l, r) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        })
    }
}

pub struct OrOperator;

impl BinaryOperator for OrOperator {
    fn name(&self) -> &'static str {
        "or"
    }

    fn symbol(&self) -> &'static str {
        "OR"
    }

    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType> {
        validate_boolean(self.symbol(), &[left, right])
    }

    fn execute(&self, left: Value, right: Value) -> Result<Value> {
        let l = as_truth(self.symbol(), &left)?;
        let r = as_truth(self.symbol(), &right)?;
        Ok(match (l, r) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        })
    }
}

pub struct NotOperator;

impl UnaryOperator for NotOperator {
    fn name(&self) -> &'static str {
        "not"
    }

    fn symbol(&self) -> &'static str {
        "NOT"
    }

    fn validate(&self, operand: &DataType) -> Result<DataType> {
        validate_boolean(self.symbol(), &[operand])
    }

    fn execute(&self, operand: Value) -> Result<Value> {
        Ok(match as_truth(self.symbol(), &operand)? {
            Some(b) => Value::Boolean(!b),
            None => Value::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_valued_and() {
        let and = |l, r| AndOperator.execute(l, r).unwrap();
        assert_eq!(and(Value::Null, Value::Boolean(false)), Value::Boolean(false));
        assert_eq!(and(Value::Null, Value::Boolean(true)), Value::Null);
        assert_eq!(and(Value::Boolean(true), Value::Boolean(true)), Value::Boolean(true));
    }

    #[test]
    fn test_three_valued_or() {
        let or = |l, r| OrOperator.execute(l, r).unwrap();
        assert_eq!(or(Value::Null, Value::Boolean(true)), Value::Boolean(true));
        assert_eq!(or(Value::Null, Value::Boolean(false)), Value::Null);
        assert_eq!(or(Value::Boolean(false), Value::Boolean(false)), Value::Boolean(false));
    }

    #[test]
    fn test_not() {
        assert_eq!(NotOperator.execute(Value::Null), Ok(Value::Null));
        assert_eq!(
            NotOperator.execute(Value::Boolean(true)),
            Ok(Value::Boolean(false))
        );
        assert!(NotOperator.execute(Value::Integer(1)).is_err());
    }
}
