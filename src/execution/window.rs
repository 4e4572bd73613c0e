//! Window functions
//!
//! The output keeps every input row in its original order and appends one
//! column per function. Internally each partition's row indices are
//! stable-sorted by the order keys, the functions run over that ordering
//! with running accumulators, and the results scatter back to the original
//! positions. Each function is O(n) per partition after the sort.

use super::expression::{evaluate, Scope};
use crate::error::Result;
use crate::operators::{compare, compare_composite};
use crate::planning::{WindowExpr, WindowFunc};
use crate::types::{
    Direction, ExecutionContext, Expression, NullOrder, Row, Schema, SortKey, Value,
};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

/// Orders two sort-key tuples under the keys' direction and null policies.
/// Nulls place first or last absolutely, regardless of direction.
pub fn compare_sort_keys(left: &[Value], right: &[Value], keys: &[SortKey]) -> Ordering {
    for ((l, r), key) in left.iter().zip(right.iter()).zip(keys) {
        let ordering = match (l.is_null(), r.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match key.nulls {
                NullOrder::NullsFirst => Ordering::Less,
                NullOrder::NullsLast => Ordering::Greater,
            },
            (false, true) => match key.nulls {
                NullOrder::NullsFirst => Ordering::Greater,
                NullOrder::NullsLast => Ordering::Less,
            },
            (false, false) => {
                let cmp = compare(l, r).unwrap_or(Ordering::Equal);
                match key.direction {
                    Direction::Ascending => cmp,
                    Direction::Descending => cmp.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Verifies that each sort-key position holds mutually comparable non-null
/// values, so the infallible comparator below can never meet an
/// incomparable pair and silently order it as equal.
pub fn check_sort_key_types(keys: &[Vec<Value>]) -> Result<()> {
    let width = keys.first().map_or(0, Vec::len);
    for pos in 0..width {
        let mut representative: Option<&Value> = None;
        for key in keys {
            let value = &key[pos];
            if value.is_null() {
                continue;
            }
            match representative {
                Some(seen) => {
                    compare(seen, value)?;
                }
                None => representative = Some(value),
            }
        }
    }
    Ok(())
}

fn evaluate_all(
    exprs: &[Expression],
    row: &Row,
    schema: &Schema,
    ctx: &ExecutionContext,
) -> Result<Vec<Value>> {
    let scope = Scope::new(schema, row);
    exprs.iter().map(|e| evaluate(e, &scope, ctx)).collect()
}

/// A null-skipping running sum with an element count, shared by the
/// running and moving averages.
#[derive(Default)]
struct NullSafeSum {
    sum: Option<Value>,
    count: i64,
}

impl NullSafeSum {
    fn add(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        self.sum = Some(match self.sum.take() {
            Some(sum) => crate::operators::execute_add(sum, value.clone())?,
            None => value.clone(),
        });
        Ok(())
    }

    fn remove(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.count -= 1;
        if self.count == 0 {
            self.sum = None;
        } else if let Some(sum) = self.sum.take() {
            self.sum = Some(crate::operators::execute_subtract(sum, value.clone())?);
        }
        Ok(())
    }

    fn sum(&self) -> Value {
        self.sum.clone().unwrap_or(Value::Null)
    }

    fn average(&self) -> Result<Value> {
        match &self.sum {
            Some(sum) => crate::operators::execute_divide(sum.clone(), Value::Integer(self.count)),
            None => Ok(Value::Null),
        }
    }
}

/// Computes one window function over a partition whose indices are already
/// in order-key order. Returns one value per position.
fn compute_function(
    func: &WindowFunc,
    ordered: &[usize],
    order_keys: &[Vec<Value>],
    rows: &[Row],
    schema: &Schema,
    ctx: &ExecutionContext,
) -> Result<Vec<Value>> {
    let evaluate_at = |expr: &Expression, index: usize| -> Result<Value> {
        let scope = Scope::new(schema, &rows[index]);
        evaluate(expr, &scope, ctx)
    };
    let mut out = Vec::with_capacity(ordered.len());
    match func {
        WindowFunc::RowNumber => {
            for pos in 0..ordered.len() {
                out.push(Value::Integer(pos as i64 + 1));
            }
        }
        WindowFunc::Rank | WindowFunc::DenseRank => {
            let dense = matches!(func, WindowFunc::DenseRank);
            let mut rank = 0i64;
            let mut dense_rank = 0i64;
            for (pos, &index) in ordered.iter().enumerate() {
                let tied = pos > 0
                    && compare_composite(&order_keys[ordered[pos - 1]], &order_keys[index])
                        .unwrap_or(Ordering::Equal)
                        == Ordering::Equal;
                if !tied {
                    rank = pos as i64 + 1;
                    dense_rank += 1;
                }
                out.push(Value::Integer(if dense { dense_rank } else { rank }));
            }
        }
        WindowFunc::RunningSum(expr) => {
            let mut sum = NullSafeSum::default();
            for &index in ordered {
                sum.add(&evaluate_at(expr, index)?)?;
                out.push(sum.sum());
            }
        }
        WindowFunc::RunningAvg(expr) => {
            let mut sum = NullSafeSum::default();
            for &index in ordered {
                sum.add(&evaluate_at(expr, index)?)?;
                out.push(sum.average()?);
            }
        }
        WindowFunc::MovingAvg { expr, window } => {
            let mut frame: VecDeque<Value> = VecDeque::with_capacity(window + 1);
            let mut sum = NullSafeSum::default();
            for &index in ordered {
                let value = evaluate_at(expr, index)?;
                sum.add(&value)?;
                frame.push_back(value);
                if frame.len() > *window
                    && let Some(evicted) = frame.pop_front()
                {
                    sum.remove(&evicted)?;
                }
                out.push(sum.average()?);
            }
        }
        WindowFunc::Lag { expr, offset } | WindowFunc::Lead { expr, offset } => {
            let lead = matches!(func, WindowFunc::Lead { .. });
            let values: Vec<Value> = ordered
                .iter()
                .map(|&index| evaluate_at(expr, index))
                .collect::<Result<_>>()?;
            for pos in 0..ordered.len() {
                let source = if lead {
                    pos.checked_add(*offset).filter(|&p| p < values.len())
                } else {
                    pos.checked_sub(*offset)
                };
                out.push(match source {
                    Some(p) => values[p].clone(),
                    None => Value::Null,
                });
            }
        }
    }
    Ok(out)
}

pub fn execute_window(
    rows: &[Row],
    schema: &Schema,
    partition_by: &[Expression],
    order_by: &[SortKey],
    functions: &[WindowExpr],
    ctx: &ExecutionContext,
) -> Result<Vec<Row>> {
    // Partition row indices by key tuple, null grouping with null
    let mut partition_index: HashMap<Vec<Value>, usize> = HashMap::new();
    let mut partitions: Vec<Vec<usize>> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let key = evaluate_all(partition_by, row, schema, ctx)?;
        match partition_index.get(&key) {
            Some(&p) => partitions[p].push(i),
            None => {
                partition_index.insert(key, partitions.len());
                partitions.push(vec![i]);
            }
        }
    }

    let order_exprs: Vec<Expression> = order_by.iter().map(|k| k.expr.clone()).collect();
    let mut order_keys = Vec::with_capacity(rows.len());
    for row in rows {
        order_keys.push(evaluate_all(&order_exprs, row, schema, ctx)?);
    }
    check_sort_key_types(&order_keys)?;

    // One output column per function, scattered back by original index
    let mut appended: Vec<Vec<Value>> =
        (0..functions.len()).map(|_| vec![Value::Null; rows.len()]).collect();
    for partition in &partitions {
        let mut ordered = partition.clone();
        ordered.sort_by(|&a, &b| compare_sort_keys(&order_keys[a], &order_keys[b], order_by));
        for (f, window) in functions.iter().enumerate() {
            let values =
                compute_function(&window.func, &ordered, &order_keys, rows, schema, ctx)?;
            for (pos, &index) in ordered.iter().enumerate() {
                appended[f][index] = values[pos].clone();
            }
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut row = row.clone();
        for column in &appended {
            row.push(column[i].clone());
        }
        out.push(row);
    }
    Ok(out)
}
