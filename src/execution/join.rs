//! Join execution
//!
//! Two strategies. When the predicate is a pure conjunction of
//! left-column = right-column equalities, the join hashes the right side on
//! the composite key and probes with each left row. Anything else falls
//! back to a nested loop evaluating the full predicate over the combined
//! row. Either way matches come out in left-row order, then right insertion
//! order, and a left-outer join emits each unmatched left row exactly once
//! with nulls for the right columns.

use super::expression::{evaluate_predicate, Scope};
use crate::error::Result;
use crate::types::{ExecutionContext, Expression, JoinType, Row, Schema, Value};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Collects the top-level AND conjuncts of a predicate.
fn conjuncts<'a>(expr: &'a Expression, out: &mut Vec<&'a Expression>) {
    match expr {
        Expression::And(l, r) => {
            conjuncts(l, out);
            conjuncts(r, out);
        }
        other => out.push(other),
    }
}

/// Resolves a column name in exactly one of the two sides.
fn resolve_side(name: &str, left: &Schema, right: &Schema) -> Option<(bool, usize)> {
    let in_left = left.try_index_of(name).ok().flatten();
    let in_right = right.try_index_of(name).ok().flatten();
    match (in_left, in_right) {
        (Some(i), None) => Some((true, i)),
        (None, Some(i)) => Some((false, i)),
        _ => None,
    }
}

/// Extracts hash-join key pairs `(left_index, right_index)` when the
/// predicate is a conjunction of one-column-per-side equalities. Any other
/// shape returns `None` and the caller uses the nested loop.
pub fn extract_equi_keys(
    predicate: &Expression,
    left: &Schema,
    right: &Schema,
) -> Option<Vec<(usize, usize)>> {
    let mut parts = Vec::new();
    conjuncts(predicate, &mut parts);
    let mut keys = Vec::with_capacity(parts.len());
    for part in parts {
        let Expression::Equal(a, b) = part else {
            return None;
        };
        let (Expression::Column(a), Expression::Column(b)) = (a.as_ref(), b.as_ref()) else {
            return None;
        };
        let (a_side, a_index) = resolve_side(a, left, right)?;
        let (b_side, b_index) = resolve_side(b, left, right)?;
        match (a_side, b_side) {
            (true, false) => keys.push((a_index, b_index)),
            (false, true) => keys.push((b_index, a_index)),
            _ => return None,
        }
    }
    Some(keys)
}

fn null_padded(left_row: &Row, right_width: usize) -> Row {
    let mut row = left_row.clone();
    row.extend(std::iter::repeat_n(Value::Null, right_width));
    row
}

fn combined(left_row: &Row, right_row: &Row) -> Row {
    let mut row = left_row.clone();
    row.extend(right_row.iter().cloned());
    row
}

/// Hash keys widen integers to decimal so an integer column matches a
/// decimal column exactly as `compare` treats the same equality on the
/// nested-loop path.
fn key_component(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Decimal(Decimal::from(*i)),
        other => other.clone(),
    }
}

fn hash_join(
    left_rows: &[Row],
    right_rows: &[Row],
    keys: &[(usize, usize)],
    join_type: JoinType,
    right_width: usize,
) -> Vec<Row> {
    // Build on the right; rows with a null key component never match
    let mut index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for (i, row) in right_rows.iter().enumerate() {
        let key: Vec<Value> = keys.iter().map(|(_, r)| key_component(&row[*r])).collect();
        if key.iter().any(Value::is_null) {
            continue;
        }
        index.entry(key).or_default().push(i);
    }

    let mut out = Vec::new();
    for left_row in left_rows {
        let key: Vec<Value> =
            keys.iter().map(|(l, _)| key_component(&left_row[*l])).collect();
        let matches = if key.iter().any(Value::is_null) {
            None
        } else {
            index.get(&key)
        };
        match matches {
            Some(rights) => {
                for &i in rights {
                    out.push(combined(left_row, &right_rows[i]));
                }
            }
            None => {
                if join_type == JoinType::Left {
                    out.push(null_padded(left_row, right_width));
                }
            }
        }
    }
    out
}

fn nested_loop_join(
    left_rows: &[Row],
    right_rows: &[Row],
    predicate: &Expression,
    join_type: JoinType,
    joined_schema: &Schema,
    right_width: usize,
    ctx: &ExecutionContext,
) -> Result<Vec<Row>> {
    let mut out = Vec::new();
    for left_row in left_rows {
        let mut matched = false;
        for right_row in right_rows {
            let row = combined(left_row, right_row);
            let scope = Scope::new(joined_schema, &row);
            if evaluate_predicate(predicate, &scope, ctx)? {
                matched = true;
                out.push(row);
            }
        }
        if !matched && join_type == JoinType::Left {
            out.push(null_padded(left_row, right_width));
        }
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
pub fn execute_join(
    left_rows: &[Row],
    right_rows: &[Row],
    left_schema: &Schema,
    right_schema: &Schema,
    joined_schema: &Schema,
    predicate: &Expression,
    join_type: JoinType,
    ctx: &ExecutionContext,
) -> Result<Vec<Row>> {
    match extract_equi_keys(predicate, left_schema, right_schema) {
        Some(keys) if !keys.is_empty() => {
            tracing::debug!(left = left_rows.len(), right = right_rows.len(), "hash join");
            Ok(hash_join(left_rows, right_rows, &keys, join_type, right_schema.len()))
        }
        _ => {
            tracing::debug!(
                left = left_rows.len(),
                right = right_rows.len(),
                "nested loop join"
            );
            nested_loop_join(
                left_rows,
                right_rows,
                predicate,
                join_type,
                joined_schema,
                right_schema.len(),
                ctx,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType};
    use chrono::NaiveDate;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn schemas() -> (Schema, Schema, Schema) {
        let left = Schema::new(vec![
            Column::new("c.id", DataType::Integer),
            Column::new("c.name", DataType::Text),
        ])
        .unwrap();
        let right = Schema::new(vec![
            Column::new("o.customer_id", DataType::Integer),
            Column::new("o.total", DataType::Integer),
        ])
        .unwrap();
        let joined = left.join(&right).unwrap();
        (left, right, joined)
    }

    fn customers() -> Vec<Row> {
        vec![
            vec![Value::Integer(1), Value::text("alice")],
            vec![Value::Integer(2), Value::text("bob")],
            vec![Value::Integer(3), Value::text("carol")],
        ]
    }

    fn orders() -> Vec<Row> {
        vec![
            vec![Value::Integer(1), Value::Integer(100)],
            vec![Value::Integer(1), Value::Integer(200)],
            vec![Value::Integer(3), Value::Integer(50)],
        ]
    }

    #[test]
    fn test_equi_key_extraction() {
        let (left, right, _) = schemas();
        let predicate = Expression::column("c.id").eq(Expression::column("o.customer_id"));
        assert_eq!(extract_equi_keys(&predicate, &left, &right), Some(vec![(0, 0)]));
        // Reversed sides still resolve
        let predicate = Expression::column("o.customer_id").eq(Expression::column("c.id"));
        assert_eq!(extract_equi_keys(&predicate, &left, &right), Some(vec![(0, 0)]));
        // A non-equality conjunct defeats extraction
        let predicate = Expression::column("c.id")
            .eq(Expression::column("o.customer_id"))
            .and(Expression::column("o.total").gt(Expression::literal(Value::Integer(0))));
        assert_eq!(extract_equi_keys(&predicate, &left, &right), None);
    }

    #[test]
    fn test_inner_join_matches_in_left_order() {
        let (left, right, joined) = schemas();
        let predicate = Expression::column("c.id").eq(Expression::column("o.customer_id"));
        let rows = execute_join(
            &customers(),
            &orders(),
            &left,
            &right,
            &joined,
            &predicate,
            JoinType::Inner,
            &ctx(),
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], Value::text("alice"));
        assert_eq!(rows[0][3], Value::Integer(100));
        assert_eq!(rows[1][3], Value::Integer(200));
        assert_eq!(rows[2][1], Value::text("carol"));
    }

    #[test]
    fn test_left_join_pads_unmatched_once() {
        let (left, right, joined) = schemas();
        let predicate = Expression::column("c.id").eq(Expression::column("o.customer_id"));
        let rows = execute_join(
            &customers(),
            &orders(),
            &left,
            &right,
            &joined,
            &predicate,
            JoinType::Left,
            &ctx(),
        )
        .unwrap();
        assert_eq!(rows.len(), 4);
        // bob has no orders: one null-padded row
        let bob: Vec<&Row> = rows.iter().filter(|r| r[1] == Value::text("bob")).collect();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0][2], Value::Null);
        assert_eq!(bob[0][3], Value::Null);
    }

    #[test]
    fn test_null_keys_never_match() {
        let (left, right, joined) = schemas();
        let predicate = Expression::column("c.id").eq(Expression::column("o.customer_id"));
        let left_rows = vec![vec![Value::Null, Value::text("ghost")]];
        let right_rows = vec![vec![Value::Null, Value::Integer(10)]];
        let inner = execute_join(
            &left_rows, &right_rows, &left, &right, &joined, &predicate,
            JoinType::Inner, &ctx(),
        )
        .unwrap();
        assert!(inner.is_empty());
        let outer = execute_join(
            &left_rows, &right_rows, &left, &right, &joined, &predicate,
            JoinType::Left, &ctx(),
        )
        .unwrap();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0][3], Value::Null);
    }

    #[test]
    fn test_hash_join_matches_integer_to_decimal_key() {
        let left = Schema::new(vec![Column::new("l.id", DataType::Integer)]).unwrap();
        let right = Schema::new(vec![Column::new("r.ref_id", DataType::Decimal)]).unwrap();
        let joined = left.join(&right).unwrap();
        let predicate = Expression::column("l.id").eq(Expression::column("r.ref_id"));
        let left_rows = vec![vec![Value::Integer(1)], vec![Value::Integer(2)]];
        let right_rows = vec![vec![Value::Decimal(Decimal::new(10, 1))]];
        assert!(extract_equi_keys(&predicate, &left, &right).is_some());
        let hash = execute_join(
            &left_rows, &right_rows, &left, &right, &joined, &predicate,
            JoinType::Inner, &ctx(),
        )
        .unwrap();
        // The hash path agrees with what the nested loop's compare would say
        let wrapped = Expression::Not(Box::new(
            Expression::column("l.id").ne(Expression::column("r.ref_id")),
        ));
        let nested = execute_join(
            &left_rows, &right_rows, &left, &right, &joined, &wrapped,
            JoinType::Inner, &ctx(),
        )
        .unwrap();
        assert_eq!(hash, nested);
        assert_eq!(hash.len(), 1);
        assert_eq!(hash[0][0], Value::Integer(1));
    }

    #[test]
    fn test_nested_loop_fallback_agrees_with_hash() {
        let (left, right, joined) = schemas();
        // Wrap the equality so extraction fails and the nested loop runs
        let predicate = Expression::Not(Box::new(
            Expression::column("c.id").ne(Expression::column("o.customer_id")),
        ));
        let rows = execute_join(
            &customers(),
            &orders(),
            &left,
            &right,
            &joined,
            &predicate,
            JoinType::Inner,
            &ctx(),
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
    }
}
