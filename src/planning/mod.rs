//! Logical plans and plan rewrites

pub mod optimizer;
pub mod plan;

pub use plan::{AggregateExpr, AggregateFunc, Node, Plan, WindowExpr, WindowFunc};
