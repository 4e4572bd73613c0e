//! Expression operators
//!
//! Operators live behind the `BinaryOperator`/`UnaryOperator` traits so each
//! one pairs its static type validation with its runtime execution. The
//! free functions here are the dispatch surface the evaluator and the schema
//! inference use.

mod arithmetic;
mod comparison;
mod like;
mod logical;
mod traits;

pub use comparison::{compare, compare_composite};
pub use traits::{BinaryOperator, UnaryOperator};

use crate::error::Result;
use crate::types::{DataType, Value};

use arithmetic::{AddOperator, DivideOperator, MultiplyOperator, NegateOperator, SubtractOperator};
use comparison::{
    EqualOperator, GreaterThanOperator, GreaterThanOrEqualOperator, LessThanOperator,
    LessThanOrEqualOperator, NotEqualOperator,
};
use like::LikeOperator;
use logical::{AndOperator, NotOperator, OrOperator};

macro_rules! binary_dispatch {
    ($execute_fn:ident, $validate_fn:ident, $op:expr) => {
        pub fn $execute_fn(left: Value, right: Value) -> Result<Value> {
            $op.execute(left, right)
        }

        pub fn $validate_fn(left: &DataType, right: &DataType) -> Result<DataType> {
            $op.validate(left, right)
        }
    };
}

macro_rules! unary_dispatch {
    ($execute_fn:ident, $validate_fn:ident, $op:expr) => {
        pub fn $execute_fn(operand: Value) -> Result<Value> {
            $op.execute(operand)
        }

        pub fn $validate_fn(operand: &DataType) -> Result<DataType> {
            $op.validate(operand)
        }
    };
}

binary_dispatch!(execute_add, validate_add, AddOperator);
binary_dispatch!(execute_subtract, validate_subtract, SubtractOperator);
binary_dispatch!(execute_multiply, validate_multiply, MultiplyOperator);
binary_dispatch!(execute_divide, validate_divide, DivideOperator);
binary_dispatch!(execute_equal, validate_equal, EqualOperator);
binary_dispatch!(execute_not_equal, validate_not_equal, NotEqualOperator);
binary_dispatch!(execute_less_than, validate_less_than, LessThanOperator);
binary_dispatch!(
    execute_less_than_or_equal,
    validate_less_than_or_equal,
    LessThanOrEqualOperator
);
binary_dispatch!(execute_greater_than, validate_greater_than, GreaterThanOperator);
binary_dispatch!(
    execute_greater_than_or_equal,
    validate_greater_than_or_equal,
    GreaterThanOrEqualOperator
);
binary_dispatch!(execute_and, validate_and, AndOperator);
binary_dispatch!(execute_or, validate_or, OrOperator);
binary_dispatch!(execute_like, validate_like, LikeOperator);
unary_dispatch!(execute_not, validate_not, NotOperator);
unary_dispatch!(execute_negate, validate_negate, NegateOperator);
