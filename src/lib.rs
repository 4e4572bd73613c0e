//! An embedded in-memory analytical query engine.
//!
//! Load typed tables into an [`Engine`], build a logical [`Plan`] tree
//! (scans, filters, joins, aggregation, window functions, sort, limit), and
//! execute it against an explicit [`ExecutionContext`]. Execution is pure:
//! identical inputs always produce identical results.
//!
//! ```
//! use memquery::{
//!     Column, DataType, Engine, ExecutionContext, Expression, Node, Plan, Schema, Table, Value,
//! };
//! use chrono::NaiveDate;
//!
//! let schema = Schema::new(vec![
//!     Column::new("name", DataType::Text),
//!     Column::new("price", DataType::Integer),
//! ])?;
//! let rows = vec![
//!     vec![Value::text("laptop"), Value::Integer(1200)],
//!     vec![Value::text("mouse"), Value::Integer(25)],
//! ];
//! let mut engine = Engine::new();
//! engine.register(Table::load("products", schema, rows)?)?;
//!
//! let plan = Plan::new(Node::Filter {
//!     source: Box::new(Node::Scan { table: "products".into(), alias: None }),
//!     predicate: Expression::column("price").gt(Expression::literal(Value::Integer(100))),
//! });
//! let ctx = ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
//! let result = engine.execute(&plan, &ctx)?;
//! assert_eq!(result.row_count(), 1);
//! # Ok::<(), memquery::Error>(())
//! ```

mod error;
mod execution;
mod functions;
mod operators;
mod planning;
mod storage;
mod types;

pub use error::{Error, Result};
pub use execution::expression::{evaluate, evaluate_predicate, Scope};
pub use execution::Engine;
pub use planning::{AggregateExpr, AggregateFunc, Node, Plan, WindowExpr, WindowFunc};
pub use storage::{Catalog, Table};
pub use types::{
    Column, DataType, Direction, ExecutionContext, Expression, JoinType, NullOrder, Row, Rows,
    Schema, SortKey, Value,
};
