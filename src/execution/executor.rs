//! Plan execution
//!
//! `Engine::execute` validates the whole tree up front by inferring its
//! output schema, rewrites it through the optimizer, then drives the node
//! tree. Scan, Filter, Project, and Limit stream through boxed iterators;
//! Join (build side), Aggregate, Window, and Sort materialize their input.
//! The first error in pipeline order aborts the execution with no partial
//! result.

use super::aggregator::Aggregator;
use super::expression::{evaluate, evaluate_predicate, Scope};
use super::join::execute_join;
use super::window::{check_sort_key_types, compare_sort_keys, execute_window};
use crate::error::{Error, Result};
use crate::planning::optimizer::push_down_filters;
use crate::planning::{Node, Plan};
use crate::storage::{Catalog, Table};
use crate::types::{DataType, ExecutionContext, Row, Rows, Schema, Value};
use rust_decimal::Decimal;

#[derive(Debug, Default)]
pub struct Engine {
    catalog: Catalog,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: Table) -> Result<()> {
        self.catalog.register(table)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs a plan to completion and materializes the result as a table.
    pub fn execute(&self, plan: &Plan, ctx: &ExecutionContext) -> Result<Table> {
        let schema = plan.output_schema(&self.catalog)?;
        let root = push_down_filters(plan.root.clone(), &self.catalog)?;
        tracing::debug!(plan = %root, "executing plan");
        let mut rows = execute_node(&root, &self.catalog, ctx)?.collect::<Result<Vec<Row>>>()?;
        widen_decimal_columns(&schema, &mut rows);
        tracing::debug!(rows = rows.len(), "plan produced result");
        Table::load("result", schema, rows)
    }
}

/// Integer values landing in a decimal-typed result column widen to
/// decimal. Schema inference unifies mixed numeric branches (CASE arms, for
/// one) to decimal, so the materialized rows must agree with it.
fn widen_decimal_columns(schema: &Schema, rows: &mut [Row]) {
    let decimal_columns: Vec<usize> = schema
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.datatype == DataType::Decimal)
        .map(|(i, _)| i)
        .collect();
    if decimal_columns.is_empty() {
        return;
    }
    for row in rows {
        for &i in &decimal_columns {
            if let Value::Integer(n) = row[i] {
                row[i] = Value::Decimal(Decimal::from(n));
            }
        }
    }
}

fn execute_node<'a>(
    node: &'a Node,
    catalog: &'a Catalog,
    ctx: &'a ExecutionContext,
) -> Result<Rows<'a>> {
    match node {
        Node::Scan { table, .. } => {
            let table = catalog.get(table)?;
            Ok(Box::new(table.scan().map(Ok)))
        }

        Node::Filter { source, predicate } => {
            let schema = source.output_schema(catalog)?;
            let rows = execute_node(source, catalog, ctx)?;
            Ok(Box::new(rows.filter_map(move |row| match row {
                Err(e) => Some(Err(e)),
                Ok(row) => {
                    let scope = Scope::new(&schema, &row);
                    match evaluate_predicate(predicate, &scope, ctx) {
                        Ok(true) => Some(Ok(row)),
                        Ok(false) => None,
                        Err(e) => Some(Err(e)),
                    }
                }
            })))
        }

        Node::Project { source, expressions, .. } => {
            let schema = source.output_schema(catalog)?;
            let rows = execute_node(source, catalog, ctx)?;
            Ok(Box::new(rows.map(move |row| {
                let row = row?;
                let scope = Scope::new(&schema, &row);
                expressions.iter().map(|e| evaluate(e, &scope, ctx)).collect()
            })))
        }

        Node::Join { left, right, predicate, join_type } => {
            let left_schema = left.output_schema(catalog)?;
            let right_schema = right.output_schema(catalog)?;
            let joined_schema = left_schema.join(&right_schema)?;
            let left_rows = execute_node(left, catalog, ctx)?.collect::<Result<Vec<Row>>>()?;
            let right_rows = execute_node(right, catalog, ctx)?.collect::<Result<Vec<Row>>>()?;
            let out = execute_join(
                &left_rows,
                &right_rows,
                &left_schema,
                &right_schema,
                &joined_schema,
                predicate,
                *join_type,
                ctx,
            )?;
            Ok(Box::new(out.into_iter().map(Ok)))
        }

        Node::Aggregate { source, group_by, aggregates, having } => {
            let input_schema = source.output_schema(catalog)?;
            let output_schema = node.output_schema(catalog)?;
            let mut aggregator = Aggregator::new(group_by, aggregates, &input_schema, ctx);
            for row in execute_node(source, catalog, ctx)? {
                aggregator.add(&row?)?;
            }
            let mut rows = aggregator.finish()?;
            if let Some(having) = having {
                let mut kept = Vec::with_capacity(rows.len());
                for row in rows {
                    let scope = Scope::new(&output_schema, &row);
                    if evaluate_predicate(having, &scope, ctx)? {
                        kept.push(row);
                    }
                }
                rows = kept;
            }
            Ok(Box::new(rows.into_iter().map(Ok)))
        }

        Node::Window { source, partition_by, order_by, functions } => {
            let schema = source.output_schema(catalog)?;
            let rows = execute_node(source, catalog, ctx)?.collect::<Result<Vec<Row>>>()?;
            let out = execute_window(&rows, &schema, partition_by, order_by, functions, ctx)?;
            Ok(Box::new(out.into_iter().map(Ok)))
        }

        Node::Sort { source, keys } => {
            let schema = source.output_schema(catalog)?;
            let rows = execute_node(source, catalog, ctx)?.collect::<Result<Vec<Row>>>()?;
            let mut key_rows = Vec::with_capacity(rows.len());
            for row in &rows {
                let scope = Scope::new(&schema, row);
                let key: Vec<Value> = keys
                    .iter()
                    .map(|k| evaluate(&k.expr, &scope, ctx))
                    .collect::<Result<_>>()?;
                key_rows.push(key);
            }
            check_sort_key_types(&key_rows)?;
            let mut keyed: Vec<(Vec<Value>, Row)> = key_rows.into_iter().zip(rows).collect();
            // Stable sort: ties keep input order
            keyed.sort_by(|(a, _), (b, _)| compare_sort_keys(a, b, keys));
            Ok(Box::new(keyed.into_iter().map(|(_, row)| Ok(row))))
        }

        Node::Limit { source, limit } => {
            if *limit < 0 {
                return Err(Error::InvalidLimit(*limit));
            }
            let rows = execute_node(source, catalog, ctx)?;
            Ok(Box::new(rows.take(*limit as usize)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType, Expression, Schema, SortKey};
    use chrono::NaiveDate;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn engine() -> Engine {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("total", DataType::Integer),
        ])
        .unwrap();
        let rows = vec![
            vec![Value::Integer(1), Value::Integer(30)],
            vec![Value::Integer(2), Value::Integer(10)],
            vec![Value::Integer(3), Value::Integer(20)],
        ];
        let mut engine = Engine::new();
        engine.register(Table::load("orders", schema, rows).unwrap()).unwrap();
        engine
    }

    fn scan() -> Node {
        Node::Scan { table: "orders".into(), alias: None }
    }

    #[test]
    fn test_negative_limit_fails_before_any_row() {
        let engine = engine();
        let plan = Plan::new(Node::Limit { source: Box::new(scan()), limit: -1 });
        assert_eq!(engine.execute(&plan, &ctx()), Err(Error::InvalidLimit(-1)));
        let plan = Plan::new(Node::Limit { source: Box::new(scan()), limit: 0 });
        assert_eq!(engine.execute(&plan, &ctx()).unwrap().row_count(), 0);
    }

    #[test]
    fn test_sort_and_limit() {
        let engine = engine();
        let plan = Plan::new(Node::Limit {
            source: Box::new(Node::Sort {
                source: Box::new(scan()),
                keys: vec![SortKey::desc(Expression::column("total"))],
            }),
            limit: 2,
        });
        let result = engine.execute(&plan, &ctx()).unwrap();
        let rows = result.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Value::Integer(30));
        assert_eq!(rows[1][1], Value::Integer(20));
    }

    #[test]
    fn test_execution_is_deterministic() {
        let engine = engine();
        let plan = Plan::new(Node::Filter {
            source: Box::new(scan()),
            predicate: Expression::column("total").gt(Expression::literal(Value::Integer(10))),
        });
        let first = engine.execute(&plan, &ctx()).unwrap().rows();
        let second = engine.execute(&plan, &ctx()).unwrap().rows();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_unknown_table_fails() {
        let engine = engine();
        let plan = Plan::new(Node::Scan { table: "missing".into(), alias: None });
        assert_eq!(
            engine.execute(&plan, &ctx()),
            Err(Error::TableNotFound("missing".into()))
        );
    }
}
