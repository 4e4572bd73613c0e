//! Operator traits
//!
//! Every operator splits static validation (type inference over `DataType`,
//! used by plan-time schema inference) from runtime execution over `Value`.

use crate::error::Result;
use crate::types::{DataType, Value};

pub trait BinaryOperator {
    fn name(&self) -> &'static str;

    fn symbol(&self) -> &'static str;

    /// Infers the output type, or `TypeMismatch` when the operand types can
    /// never combine.
    fn validate(&self, left: &DataType, right: &DataType) -> Result<DataType>;

    fn execute(&self, left: Value, right: Value) -> Result<Value>;
}

pub trait UnaryOperator {
    fn name(&self) -> &'static str;

    fn symbol(&self) -> &'static str;

    fn validate(&self, operand: &DataType) -> Result<DataType>;

    fn execute(&self, operand: Value) -> Result<Value>;
}
