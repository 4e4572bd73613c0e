//! Plan rewrites
//!
//! The only rewrite is predicate pushdown: a conjunct of a filter sitting
//! above a join that references a single side's columns moves beneath the
//! join on that side. Join order is never changed.

use super::plan::Node;
use crate::error::Result;
use crate::storage::Catalog;
use crate::types::{Expression, JoinType, Schema};

/// Splits a predicate into its top-level AND conjuncts.
pub fn split_conjuncts(expr: Expression) -> Vec<Expression> {
    match expr {
        Expression::And(l, r) => {
            let mut parts = split_conjuncts(*l);
            parts.extend(split_conjuncts(*r));
            parts
        }
        other => vec![other],
    }
}

fn combine_conjuncts(parts: Vec<Expression>) -> Option<Expression> {
    parts.into_iter().reduce(Expression::and)
}

/// Names of every column the expression references.
fn collect_columns<'a>(expr: &'a Expression, out: &mut Vec<&'a str>) {
    use Expression::*;
    match expr {
        Literal(_) => {}
        Column(name) => out.push(name),
        And(l, r) | Or(l, r) | Equal(l, r) | NotEqual(l, r) | LessThan(l, r)
        | LessThanOrEqual(l, r) | GreaterThan(l, r) | GreaterThanOrEqual(l, r) | Add(l, r)
        | Subtract(l, r) | Multiply(l, r) | Divide(l, r) => {
            collect_columns(l, out);
            collect_columns(r, out);
        }
        Not(e) | Negate(e) | IsNull { expr: e, .. } => collect_columns(e, out),
        Like { expr, pattern, .. } => {
            collect_columns(expr, out);
            collect_columns(pattern, out);
        }
        InList { expr, list, .. } => {
            collect_columns(expr, out);
            for item in list {
                collect_columns(item, out);
            }
        }
        Between { expr, low, high, .. } => {
            collect_columns(expr, out);
            collect_columns(low, out);
            collect_columns(high, out);
        }
        Function(_, args) => {
            for arg in args {
                collect_columns(arg, out);
            }
        }
        Case { operand, when_clauses, else_clause } => {
            if let Some(e) = operand {
                collect_columns(e, out);
            }
            for (when, then) in when_clauses {
                collect_columns(when, out);
                collect_columns(then, out);
            }
            if let Some(e) = else_clause {
                collect_columns(e, out);
            }
        }
    }
}

/// True when every column the expression references resolves in `schema`.
fn resolves_in(expr: &Expression, schema: &Schema) -> bool {
    let mut columns = Vec::new();
    collect_columns(expr, &mut columns);
    columns
        .iter()
        .all(|name| matches!(schema.try_index_of(name), Ok(Some(_))))
}

/// Pushes filter conjuncts beneath joins where that preserves semantics.
///
/// A conjunct over only the left side's columns always pushes down. A
/// conjunct over only the right side pushes down for inner joins; under a
/// left-outer join it must stay above, because below the join it would not
/// see the null-padded rows.
pub fn push_down_filters(node: Node, catalog: &Catalog) -> Result<Node> {
    Ok(match node {
        Node::Filter { source, predicate } => {
            let source = push_down_filters(*source, catalog)?;
            match source {
                Node::Join { left, right, predicate: join_predicate, join_type } => {
                    let left_schema = left.output_schema(catalog)?;
                    let right_schema = right.output_schema(catalog)?;
                    let mut push_left = Vec::new();
                    let mut push_right = Vec::new();
                    let mut keep = Vec::new();
                    for conjunct in split_conjuncts(predicate) {
                        if resolves_in(&conjunct, &left_schema) {
                            push_left.push(conjunct);
                        } else if join_type == JoinType::Inner
                            && resolves_in(&conjunct, &right_schema)
                        {
                            push_right.push(conjunct);
                        } else {
                            keep.push(conjunct);
                        }
                    }
                    let left = match combine_conjuncts(push_left) {
                        Some(predicate) => {
                            tracing::debug!(%predicate, "pushing filter below left join input");
                            Box::new(push_down_filters(
                                Node::Filter { source: left, predicate },
                                catalog,
                            )?)
                        }
                        None => left,
                    };
                    let right = match combine_conjuncts(push_right) {
                        Some(predicate) => {
                            tracing::debug!(%predicate, "pushing filter below right join input");
                            Box::new(push_down_filters(
                                Node::Filter { source: right, predicate },
                                catalog,
                            )?)
                        }
                        None => right,
                    };
                    let join = Node::Join { left, right, predicate: join_predicate, join_type };
                    match combine_conjuncts(keep) {
                        Some(predicate) => {
                            Node::Filter { source: Box::new(join), predicate }
                        }
                        None => join,
                    }
                }
                other => Node::Filter { source: Box::new(other), predicate },
            }
        }
        Node::Join { left, right, predicate, join_type } => Node::Join {
            left: Box::new(push_down_filters(*left, catalog)?),
            right: Box::new(push_down_filters(*right, catalog)?),
            predicate,
            join_type,
        },
        Node::Project { source, expressions, aliases } => Node::Project {
            source: Box::new(push_down_filters(*source, catalog)?),
            expressions,
            aliases,
        },
        Node::Aggregate { source, group_by, aggregates, having } => Node::Aggregate {
            source: Box::new(push_down_filters(*source, catalog)?),
            group_by,
            aggregates,
            having,
        },
        Node::Window { source, partition_by, order_by, functions } => Node::Window {
            source: Box::new(push_down_filters(*source, catalog)?),
            partition_by,
            order_by,
            functions,
        },
        Node::Sort { source, keys } => {
            Node::Sort { source: Box::new(push_down_filters(*source, catalog)?), keys }
        }
        Node::Limit { source, limit } => {
            Node::Limit { source: Box::new(push_down_filters(*source, catalog)?), limit }
        }
        leaf @ Node::Scan { .. } => leaf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Table;
    use crate::types::{Column, DataType, Value};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let customers = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("country", DataType::Enum),
        ])
        .unwrap();
        let orders = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("customer_id", DataType::Integer),
        ])
        .unwrap();
        catalog
            .register(Table::load("customers", customers, vec![]).unwrap())
            .unwrap();
        catalog
            .register(Table::load("orders", orders, vec![]).unwrap())
            .unwrap();
        catalog
    }

    fn join(join_type: JoinType) -> Node {
        Node::Join {
            left: Box::new(Node::Scan { table: "customers".into(), alias: Some("c".into()) }),
            right: Box::new(Node::Scan { table: "orders".into(), alias: Some("o".into()) }),
            predicate: Expression::column("c.id").eq(Expression::column("o.customer_id")),
            join_type,
        }
    }

    #[test]
    fn test_single_side_conjunct_pushes_down() {
        let catalog = catalog();
        let filter = Node::Filter {
            source: Box::new(join(JoinType::Inner)),
            predicate: Expression::column("c.country")
                .eq(Expression::literal(Value::text("USA")))
                .and(Expression::column("o.id").gt(Expression::literal(Value::Integer(10)))),
        };
        let optimized = push_down_filters(filter, &catalog).unwrap();
        let Node::Join { left, right, .. } = optimized else {
            panic!("filter should dissolve into the join inputs");
        };
        assert!(matches!(*left, Node::Filter { .. }));
        assert!(matches!(*right, Node::Filter { .. }));
    }

    #[test]
    fn test_right_side_conjunct_stays_above_left_join() {
        let catalog = catalog();
        let filter = Node::Filter {
            source: Box::new(join(JoinType::Left)),
            predicate: Expression::column("o.id").gt(Expression::literal(Value::Integer(10))),
        };
        let optimized = push_down_filters(filter, &catalog).unwrap();
        assert!(matches!(optimized, Node::Filter { .. }));
    }

    #[test]
    fn test_cross_side_conjunct_stays() {
        let catalog = catalog();
        let filter = Node::Filter {
            source: Box::new(join(JoinType::Inner)),
            predicate: Expression::column("c.id").lt(Expression::column("o.id")),
        };
        let optimized = push_down_filters(filter, &catalog).unwrap();
        assert!(matches!(optimized, Node::Filter { .. }));
    }

    #[test]
    fn test_schema_preserved() {
        let catalog = catalog();
        let filter = Node::Filter {
            source: Box::new(join(JoinType::Inner)),
            predicate: Expression::column("c.country").eq(Expression::literal(Value::text("UK"))),
        };
        let before = filter.output_schema(&catalog).unwrap();
        let optimized = push_down_filters(filter, &catalog).unwrap();
        assert_eq!(optimized.output_schema(&catalog).unwrap(), before);
    }
}
