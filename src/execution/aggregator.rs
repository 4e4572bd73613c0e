//! Grouped aggregation
//!
//! Rows are partitioned by their evaluated group-key tuple. Key equality is
//! null-aware: null groups with null, unlike comparison in a filter, so
//! every row lands in exactly one partition. Output rows come out in
//! first-encountered key order, which the bucket index map alone cannot
//! give, so the aggregator keeps an ordered bucket vector beside it.

use super::expression::{evaluate, Scope};
use crate::error::Result;
use crate::operators;
use crate::planning::{AggregateExpr, AggregateFunc};
use crate::types::{ExecutionContext, Expression, Row, Schema, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

trait Accumulator {
    fn add(&mut self, value: Value) -> Result<()>;
    fn finalize(&mut self) -> Result<Value>;
}

/// COUNT(*) or COUNT(expr); the latter skips nulls.
struct Count {
    count: i64,
    skip_nulls: bool,
}

impl Accumulator for Count {
    fn add(&mut self, value: Value) -> Result<()> {
        if !(self.skip_nulls && value.is_null()) {
            self.count += 1;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Value> {
        Ok(Value::Integer(self.count))
    }
}

struct DistinctCount {
    seen: HashSet<Value>,
}

impl Accumulator for DistinctCount {
    fn add(&mut self, value: Value) -> Result<()> {
        if !value.is_null() {
            self.seen.insert(value);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Value> {
        Ok(Value::Integer(self.seen.len() as i64))
    }
}

struct Sum {
    sum: Option<Value>,
}

impl Accumulator for Sum {
    fn add(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.sum = Some(match self.sum.take() {
            Some(sum) => operators::execute_add(sum, value)?,
            None => value,
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<Value> {
        Ok(self.sum.take().unwrap_or(Value::Null))
    }
}

struct Avg {
    sum: Option<Value>,
    count: i64,
}

impl Accumulator for Avg {
    fn add(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        self.sum = Some(match self.sum.take() {
            Some(sum) => operators::execute_add(sum, value)?,
            None => value,
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<Value> {
        match self.sum.take() {
            Some(sum) => operators::execute_divide(sum, Value::Integer(self.count)),
            None => Ok(Value::Null),
        }
    }
}

struct Extreme {
    best: Option<Value>,
    keep: Ordering,
}

impl Accumulator for Extreme {
    fn add(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.best = Some(match self.best.take() {
            Some(best) => {
                if operators::compare(&value, &best)? == self.keep {
                    value
                } else {
                    best
                }
            }
            None => value,
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<Value> {
        Ok(self.best.take().unwrap_or(Value::Null))
    }
}

fn make_accumulator(func: &AggregateFunc) -> Box<dyn Accumulator> {
    match func {
        AggregateFunc::CountStar => Box::new(Count { count: 0, skip_nulls: false }),
        AggregateFunc::Count(_) => Box::new(Count { count: 0, skip_nulls: true }),
        AggregateFunc::CountDistinct(_) => Box::new(DistinctCount { seen: HashSet::new() }),
        AggregateFunc::Sum(_) => Box::new(Sum { sum: None }),
        AggregateFunc::Avg(_) => Box::new(Avg { sum: None, count: 0 }),
        AggregateFunc::Min(_) => Box::new(Extreme { best: None, keep: Ordering::Less }),
        AggregateFunc::Max(_) => Box::new(Extreme { best: None, keep: Ordering::Greater }),
    }
}

pub struct Aggregator<'a> {
    group_by: &'a [Expression],
    aggregates: &'a [AggregateExpr],
    schema: &'a Schema,
    ctx: &'a ExecutionContext,
    bucket_index: HashMap<Vec<Value>, usize>,
    buckets: Vec<(Vec<Value>, Vec<Box<dyn Accumulator>>)>,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        group_by: &'a [Expression],
        aggregates: &'a [AggregateExpr],
        schema: &'a Schema,
        ctx: &'a ExecutionContext,
    ) -> Self {
        let mut aggregator = Self {
            group_by,
            aggregates,
            schema,
            ctx,
            bucket_index: HashMap::new(),
            buckets: Vec::new(),
        };
        // Without grouping there is one implicit partition, present even
        // over empty input
        if group_by.is_empty() {
            aggregator.bucket_index.insert(Vec::new(), 0);
            aggregator
                .buckets
                .push((Vec::new(), aggregates.iter().map(|a| make_accumulator(&a.func)).collect()));
        }
        aggregator
    }

    pub fn add(&mut self, row: &Row) -> Result<()> {
        let scope = Scope::new(self.schema, row);
        let mut key = Vec::with_capacity(self.group_by.len());
        for expr in self.group_by {
            key.push(evaluate(expr, &scope, self.ctx)?);
        }
        let index = match self.bucket_index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.buckets.len();
                self.bucket_index.insert(key.clone(), i);
                self.buckets.push((
                    key,
                    self.aggregates.iter().map(|a| make_accumulator(&a.func)).collect(),
                ));
                i
            }
        };
        let accumulators = &mut self.buckets[index].1;
        for (accumulator, agg) in accumulators.iter_mut().zip(self.aggregates) {
            let value = match &agg.func {
                AggregateFunc::CountStar => Value::Boolean(true),
                AggregateFunc::Count(e)
                | AggregateFunc::CountDistinct(e)
                | AggregateFunc::Sum(e)
                | AggregateFunc::Avg(e)
                | AggregateFunc::Min(e)
                | AggregateFunc::Max(e) => evaluate(e, &scope, self.ctx)?,
            };
            accumulator.add(value)?;
        }
        Ok(())
    }

    /// One row per partition, in first-encountered order: the group key
    /// values followed by the finalized aggregates.
    pub fn finish(self) -> Result<Vec<Row>> {
        let mut out = Vec::with_capacity(self.buckets.len());
        for (key, mut accumulators) in self.buckets {
            let mut row = key;
            for accumulator in &mut accumulators {
                row.push(accumulator.finalize()?);
            }
            out.push(row);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("country", DataType::Enum),
            Column::new("total", DataType::Integer),
        ])
        .unwrap()
    }

    fn run(group_by: Vec<Expression>, aggregates: Vec<AggregateExpr>, rows: Vec<Row>) -> Vec<Row> {
        let schema = schema();
        let ctx = ctx();
        let mut aggregator = Aggregator::new(&group_by, &aggregates, &schema, &ctx);
        for row in &rows {
            aggregator.add(row).unwrap();
        }
        aggregator.finish().unwrap()
    }

    #[test]
    fn test_first_encountered_order() {
        let rows = vec![
            vec![Value::text("UK"), Value::Integer(10)],
            vec![Value::text("USA"), Value::Integer(20)],
            vec![Value::text("UK"), Value::Integer(30)],
        ];
        let out = run(
            vec![Expression::column("country")],
            vec![AggregateExpr::new(AggregateFunc::CountStar, "n")],
            rows,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], vec![Value::text("UK"), Value::Integer(2)]);
        assert_eq!(out[1], vec![Value::text("USA"), Value::Integer(1)]);
    }

    #[test]
    fn test_null_groups_with_null() {
        let rows = vec![
            vec![Value::Null, Value::Integer(1)],
            vec![Value::Null, Value::Integer(2)],
        ];
        let out = run(
            vec![Expression::column("country")],
            vec![AggregateExpr::new(AggregateFunc::CountStar, "n")],
            rows,
        );
        assert_eq!(out, vec![vec![Value::Null, Value::Integer(2)]]);
    }

    #[test]
    fn test_count_variants_skip_nulls() {
        let rows = vec![
            vec![Value::text("USA"), Value::Integer(5)],
            vec![Value::text("USA"), Value::Null],
            vec![Value::text("USA"), Value::Integer(5)],
        ];
        let out = run(
            vec![],
            vec![
                AggregateExpr::new(AggregateFunc::CountStar, "all"),
                AggregateExpr::new(AggregateFunc::Count(Expression::column("total")), "non_null"),
                AggregateExpr::new(
                    AggregateFunc::CountDistinct(Expression::column("total")),
                    "distinct",
                ),
            ],
            rows,
        );
        assert_eq!(
            out,
            vec![vec![Value::Integer(3), Value::Integer(2), Value::Integer(1)]]
        );
    }

    #[test]
    fn test_avg_excludes_nulls_from_denominator() {
        let rows = vec![
            vec![Value::text("USA"), Value::Integer(10)],
            vec![Value::text("USA"), Value::Null],
            vec![Value::text("USA"), Value::Integer(20)],
        ];
        let out = run(
            vec![],
            vec![AggregateExpr::new(AggregateFunc::Avg(Expression::column("total")), "avg")],
            rows,
        );
        assert_eq!(out[0][0], Value::Decimal(Decimal::from(15)));
    }

    #[test]
    fn test_all_null_partition() {
        let rows = vec![vec![Value::text("USA"), Value::Null]];
        let out = run(
            vec![],
            vec![
                AggregateExpr::new(AggregateFunc::Sum(Expression::column("total")), "sum"),
                AggregateExpr::new(AggregateFunc::Min(Expression::column("total")), "min"),
                AggregateExpr::new(AggregateFunc::Count(Expression::column("total")), "n"),
            ],
            rows,
        );
        assert_eq!(out, vec![vec![Value::Null, Value::Null, Value::Integer(0)]]);
    }

    #[test]
    fn test_empty_input_without_grouping_yields_one_row() {
        let out = run(
            vec![],
            vec![AggregateExpr::new(AggregateFunc::CountStar, "n")],
            vec![],
        );
        assert_eq!(out, vec![vec![Value::Integer(0)]]);
        // With grouping, empty input yields no partitions
        let out = run(
            vec![Expression::column("country")],
            vec![AggregateExpr::new(AggregateFunc::CountStar, "n")],
            vec![],
        );
        assert!(out.is_empty());
    }
}
