//! The engine's data model: values, types, schemas, and expressions

pub mod context;
pub mod data_type;
pub mod expression;
pub mod query;
pub mod schema;
pub mod value;

pub use context::ExecutionContext;
pub use data_type::DataType;
pub use expression::Expression;
pub use query::{Direction, JoinType, NullOrder, Rows, SortKey};
pub use schema::{Column, Schema};
pub use value::{Row, Value};
