//! Semantic column types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic type of a column or expression.
///
/// There is no nullable wrapper: null is a legal value of every type, and the
/// loader only rejects value/type disagreements. `Null` is the type of an
/// expression whose value is always null (e.g. a bare null literal); a column
/// of type `Null` can hold nothing but nulls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    Decimal,
    Text,
    /// Enumerated text: a closed set of labels, compared like text.
    Enum,
    Date,
    Null,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Text | DataType::Enum)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Enum => write!(f, "ENUM"),
            DataType::Date => write!(f, "DATE"),
            DataType::Null => write!(f, "NULL"),
        }
    }
}
