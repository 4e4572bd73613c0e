//! Engine values
//!
//! A `Value` is the tagged union flowing through every operator: the five
//! storable semantic types plus `Boolean` (predicate results) and `Null`.
//! Equality and hashing treat null as equal to null, which is what grouping
//! and hash-join key buckets need; three-valued comparison semantics live in
//! the operator layer, not here.

use super::data_type::DataType;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of values, positionally aligned to a schema.
pub type Row = Vec<Value>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Enum(String),
    Date(NaiveDate),
}

impl Value {
    pub fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    pub fn decimal(d: Decimal) -> Self {
        Value::Decimal(d)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn boolean(b: bool) -> Self {
        Value::Boolean(b)
    }

    pub fn date(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Value::Date)
            .ok_or_else(|| {
                Error::ExecutionError(format!("Invalid date: {:04}-{:02}-{:02}", year, month, day))
            })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }

    /// The textual content of `Text` and `Enum` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// The semantic type of this value. Null has the distinguished `Null` type.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Decimal(_) => DataType::Decimal,
            Value::Text(_) => DataType::Text,
            Value::Enum(_) => DataType::Enum,
            Value::Date(_) => DataType::Date,
        }
    }

    /// Checks that this value may be stored in a column of the given type.
    ///
    /// Null is storable everywhere. Text and enumerated text are
    /// interchangeable so that loaders may supply plain strings for enum
    /// columns.
    pub fn check_type(&self, expected: &DataType) -> Result<()> {
        if self.is_null() {
            return Ok(());
        }
        let actual = self.data_type();
        let ok = match expected {
            DataType::Text | DataType::Enum => actual.is_textual(),
            other => actual == *other,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: expected.to_string(),
                found: actual.to_string(),
            })
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) | Value::Enum(s) => write!(f, "'{}'", s),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            // Text and enumerated text compare by content
            (Value::Text(a) | Value::Enum(a), Value::Text(b) | Value::Enum(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Text and Enum share a tag so equal values hash equally
        match self {
            Value::Null => 0u8.hash(state),
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Decimal(d) => {
                3u8.hash(state);
                d.hash(state);
            }
            Value::Text(s) | Value::Enum(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::Date(d) => {
                5u8.hash(state);
                d.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_type() {
        assert!(Value::Integer(1).check_type(&DataType::Integer).is_ok());
        assert!(Value::Integer(1).check_type(&DataType::Text).is_err());
        // Null is storable in any column
        assert!(Value::Null.check_type(&DataType::Date).is_ok());
        // Text and enumerated text are interchangeable
        assert!(Value::text("USA").check_type(&DataType::Enum).is_ok());
        assert!(Value::Enum("pending".into()).check_type(&DataType::Text).is_ok());
    }

    #[test]
    fn test_textual_equality() {
        assert_eq!(Value::Enum("USA".into()), Value::text("USA"));
        assert_ne!(Value::text("1"), Value::Integer(1));
    }
}
