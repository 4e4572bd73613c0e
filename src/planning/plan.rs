//! Logical query plans
//!
//! A `Plan` is a tree of relational operators built by the caller (there is
//! no SQL parser) and handed to the engine for one execution. Every node can
//! report its output schema without touching a row, which is where bad
//! column references and operand type mismatches surface early.

use crate::error::{Error, Result};
use crate::storage::Catalog;
use crate::types::{Column, DataType, Expression, JoinType, Schema, SortKey};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub root: Node,
}

impl Plan {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn output_schema(&self, catalog: &Catalog) -> Result<Schema> {
        self.root.output_schema(catalog)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scan {
        table: String,
        alias: Option<String>,
    },
    Filter {
        source: Box<Node>,
        predicate: Expression,
    },
    Join {
        left: Box<Node>,
        right: Box<Node>,
        predicate: Expression,
        join_type: JoinType,
    },
    Project {
        source: Box<Node>,
        expressions: Vec<Expression>,
        aliases: Vec<Option<String>>,
    },
    Aggregate {
        source: Box<Node>,
        group_by: Vec<Expression>,
        aggregates: Vec<AggregateExpr>,
        having: Option<Expression>,
    },
    Window {
        source: Box<Node>,
        partition_by: Vec<Expression>,
        order_by: Vec<SortKey>,
        functions: Vec<WindowExpr>,
    },
    Sort {
        source: Box<Node>,
        keys: Vec<SortKey>,
    },
    Limit {
        source: Box<Node>,
        limit: i64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateExpr {
    pub func: AggregateFunc,
    pub alias: String,
}

impl AggregateExpr {
    pub fn new(func: AggregateFunc, alias: impl Into<String>) -> Self {
        Self { func, alias: alias.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AggregateFunc {
    CountStar,
    Count(Expression),
    CountDistinct(Expression),
    Sum(Expression),
    Avg(Expression),
    Min(Expression),
    Max(Expression),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowExpr {
    pub func: WindowFunc,
    pub alias: String,
}

impl WindowExpr {
    pub fn new(func: WindowFunc, alias: impl Into<String>) -> Self {
        Self { func, alias: alias.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WindowFunc {
    RowNumber,
    /// Ties share a rank and leave a gap after the tie group.
    Rank,
    /// Ties share a rank with no gap.
    DenseRank,
    RunningSum(Expression),
    RunningAvg(Expression),
    /// Average over the trailing `window` rows (including the current one).
    MovingAvg { expr: Expression, window: usize },
    Lag { expr: Expression, offset: usize },
    Lead { expr: Expression, offset: usize },
}

/// Output column name for a projection or grouping expression: the given
/// alias, the referenced column's unqualified name, or a positional name.
fn output_name(expr: &Expression, alias: Option<&String>, index: usize) -> String {
    if let Some(alias) = alias {
        return alias.clone();
    }
    if let Expression::Column(name) = expr {
        return match name.rsplit('.').next() {
            Some(short) => short.to_string(),
            None => name.clone(),
        };
    }
    format!("column_{}", index)
}

fn check_predicate(predicate: &Expression, schema: &Schema) -> Result<()> {
    let t = predicate.infer_type(schema)?;
    if t == DataType::Boolean || t == DataType::Null {
        Ok(())
    } else {
        Err(Error::TypeMismatch { expected: "BOOLEAN".into(), found: t.to_string() })
    }
}

fn numeric_input(func: &str, t: DataType) -> Result<DataType> {
    if t.is_numeric() || t == DataType::Null {
        Ok(t)
    } else {
        Err(Error::TypeMismatch {
            expected: format!("numeric argument for {}", func),
            found: t.to_string(),
        })
    }
}

impl AggregateFunc {
    fn output_type(&self, input: &Schema) -> Result<DataType> {
        match self {
            AggregateFunc::CountStar => Ok(DataType::Integer),
            AggregateFunc::Count(e) | AggregateFunc::CountDistinct(e) => {
                e.infer_type(input)?;
                Ok(DataType::Integer)
            }
            AggregateFunc::Sum(e) => numeric_input("SUM", e.infer_type(input)?),
            AggregateFunc::Avg(e) => {
                numeric_input("AVG", e.infer_type(input)?)?;
                Ok(DataType::Decimal)
            }
            AggregateFunc::Min(e) | AggregateFunc::Max(e) => e.infer_type(input),
        }
    }
}

impl WindowFunc {
    fn output_type(&self, input: &Schema) -> Result<DataType> {
        match self {
            WindowFunc::RowNumber | WindowFunc::Rank | WindowFunc::DenseRank => {
                Ok(DataType::Integer)
            }
            WindowFunc::RunningSum(e) => numeric_input("running sum", e.infer_type(input)?),
            WindowFunc::RunningAvg(e) => {
                numeric_input("running average", e.infer_type(input)?)?;
                Ok(DataType::Decimal)
            }
            WindowFunc::MovingAvg { expr, window } => {
                if *window == 0 {
                    return Err(Error::ExecutionError(
                        "Moving average window must be at least 1".into(),
                    ));
                }
                numeric_input("moving average", expr.infer_type(input)?)?;
                Ok(DataType::Decimal)
            }
            WindowFunc::Lag { expr, .. } | WindowFunc::Lead { expr, .. } => expr.infer_type(input),
        }
    }
}

impl Node {
    /// Infers the schema this node produces. Fails on unknown tables, bad
    /// column references, and operand types that can never combine.
    pub fn output_schema(&self, catalog: &Catalog) -> Result<Schema> {
        match self {
            Node::Scan { table, alias } => {
                let schema = catalog.get(table)?.schema().clone();
                match alias {
                    Some(alias) => schema.qualify(alias),
                    None => Ok(schema),
                }
            }
            Node::Filter { source, predicate } => {
                let schema = source.output_schema(catalog)?;
                check_predicate(predicate, &schema)?;
                Ok(schema)
            }
            Node::Join { left, right, predicate, .. } => {
                let schema = left
                    .output_schema(catalog)?
                    .join(&right.output_schema(catalog)?)?;
                check_predicate(predicate, &schema)?;
                Ok(schema)
            }
            Node::Project { source, expressions, aliases } => {
                let input = source.output_schema(catalog)?;
                let mut columns = Vec::with_capacity(expressions.len());
                for (i, expr) in expressions.iter().enumerate() {
                    let name = output_name(expr, aliases.get(i).and_then(Option::as_ref), i);
                    columns.push(Column::new(name, expr.infer_type(&input)?));
                }
                Schema::new(columns)
            }
            Node::Aggregate { source, group_by, aggregates, having } => {
                let input = source.output_schema(catalog)?;
                let mut columns = Vec::with_capacity(group_by.len() + aggregates.len());
                for (i, expr) in group_by.iter().enumerate() {
                    let name = output_name(expr, None, i);
                    columns.push(Column::new(name, expr.infer_type(&input)?));
                }
                for agg in aggregates {
                    columns.push(Column::new(agg.alias.clone(), agg.func.output_type(&input)?));
                }
                let schema = Schema::new(columns)?;
                if let Some(having) = having {
                    check_predicate(having, &schema)?;
                }
                Ok(schema)
            }
            Node::Window { source, partition_by, order_by, functions } => {
                let input = source.output_schema(catalog)?;
                for expr in partition_by {
                    expr.infer_type(&input)?;
                }
                for key in order_by {
                    key.expr.infer_type(&input)?;
                }
                let mut columns = input.columns().to_vec();
                for window in functions {
                    columns.push(Column::new(
                        window.alias.clone(),
                        window.func.output_type(&input)?,
                    ));
                }
                Schema::new(columns)
            }
            Node::Sort { source, keys } => {
                let schema = source.output_schema(catalog)?;
                for key in keys {
                    key.expr.infer_type(&schema)?;
                }
                Ok(schema)
            }
            Node::Limit { source, .. } => source.output_schema(catalog),
        }
    }
}

impl Node {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Node::Scan { table, alias } => match alias {
                Some(alias) => writeln!(f, "{}Scan: {} AS {}", indent, table, alias),
                None => writeln!(f, "{}Scan: {}", indent, table),
            },
            Node::Filter { source, predicate } => {
                writeln!(f, "{}Filter: {}", indent, predicate)?;
                source.fmt_tree(f, depth + 1)
            }
            Node::Join { left, right, predicate, join_type } => {
                let kind = match join_type {
                    JoinType::Inner => "Inner",
                    JoinType::Left => "Left",
                };
                writeln!(f, "{}{}Join: {}", indent, kind, predicate)?;
                left.fmt_tree(f, depth + 1)?;
                right.fmt_tree(f, depth + 1)
            }
            Node::Project { source, expressions, .. } => {
                let exprs: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
                writeln!(f, "{}Project: {}", indent, exprs.join(", "))?;
                source.fmt_tree(f, depth + 1)
            }
            Node::Aggregate { source, group_by, aggregates, .. } => {
                let groups: Vec<String> = group_by.iter().map(|e| e.to_string()).collect();
                let aggs: Vec<String> = aggregates.iter().map(|a| a.alias.clone()).collect();
                writeln!(
                    f,
                    "{}Aggregate: group by [{}], compute [{}]",
                    indent,
                    groups.join(", "),
                    aggs.join(", ")
                )?;
                source.fmt_tree(f, depth + 1)
            }
            Node::Window { source, functions, .. } => {
                let names: Vec<String> = functions.iter().map(|w| w.alias.clone()).collect();
                writeln!(f, "{}Window: [{}]", indent, names.join(", "))?;
                source.fmt_tree(f, depth + 1)
            }
            Node::Sort { source, keys } => {
                let exprs: Vec<String> = keys.iter().map(|k| k.expr.to_string()).collect();
                writeln!(f, "{}Sort: {}", indent, exprs.join(", "))?;
                source.fmt_tree(f, depth + 1)
            }
            Node::Limit { source, limit } => {
                writeln!(f, "{}Limit: {}", indent, limit)?;
                source.fmt_tree(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
