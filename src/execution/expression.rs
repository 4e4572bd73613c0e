//! Expression evaluation
//!
//! Evaluation happens against a `Scope`: the row under the cursor plus an
//! optional chain of outer rows, so correlated evaluation threads the outer
//! row explicitly instead of capturing it. Column references resolve
//! innermost-first.

use crate::error::{Error, Result};
use crate::functions;
use crate::operators;
use crate::types::{ExecutionContext, Expression, Row, Schema, Value};

pub struct Scope<'a> {
    pub schema: &'a Schema,
    pub row: &'a Row,
    pub outer: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(schema: &'a Schema, row: &'a Row) -> Self {
        Self { schema, row, outer: None }
    }

    pub fn with_outer(schema: &'a Schema, row: &'a Row, outer: &'a Scope<'a>) -> Self {
        Self { schema, row, outer: Some(outer) }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(i) = self.schema.try_index_of(name)? {
            return Ok(self.row[i].clone());
        }
        match self.outer {
            Some(outer) => outer.lookup(name),
            None => Err(Error::UnknownColumn(name.into())),
        }
    }
}

pub fn evaluate(expr: &Expression, scope: &Scope, ctx: &ExecutionContext) -> Result<Value> {
    use Expression::*;
    match expr {
        Literal(v) => Ok(v.clone()),
        Column(name) => scope.lookup(name),

        And(l, r) => operators::execute_and(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?),
        Or(l, r) => operators::execute_or(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?),
        Not(e) => operators::execute_not(evaluate(e, scope, ctx)?),

        Equal(l, r) => {
            operators::execute_equal(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        NotEqual(l, r) => {
            operators::execute_not_equal(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        LessThan(l, r) => {
            operators::execute_less_than(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        LessThanOrEqual(l, r) => operators::execute_less_than_or_equal(
            evaluate(l, scope, ctx)?,
            evaluate(r, scope, ctx)?,
        ),
        GreaterThan(l, r) => {
            operators::execute_greater_than(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        GreaterThanOrEqual(l, r) => operators::execute_greater_than_or_equal(
            evaluate(l, scope, ctx)?,
            evaluate(r, scope, ctx)?,
        ),

        Add(l, r) => operators::execute_add(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?),
        Subtract(l, r) => {
            operators::execute_subtract(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        Multiply(l, r) => {
            operators::execute_multiply(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        Divide(l, r) => {
            operators::execute_divide(evaluate(l, scope, ctx)?, evaluate(r, scope, ctx)?)
        }
        Negate(e) => operators::execute_negate(evaluate(e, scope, ctx)?),

        IsNull { expr, negated } => {
            let v = evaluate(expr, scope, ctx)?;
            Ok(Value::Boolean(v.is_null() != *negated))
        }
        Like { expr, pattern, negated } => {
            let matched = operators::execute_like(
                evaluate(expr, scope, ctx)?,
                evaluate(pattern, scope, ctx)?,
            )?;
            if *negated { operators::execute_not(matched) } else { Ok(matched) }
        }
        InList { expr, list, negated } => {
            let v = evaluate(expr, scope, ctx)?;
            let mut unknown = false;
            let mut found = false;
            for item in list {
                match operators::execute_equal(v.clone(), evaluate(item, scope, ctx)?)? {
                    Value::Boolean(true) => {
                        found = true;
                        break;
                    }
                    Value::Null => unknown = true,
                    _ => {}
                }
            }
            let result = if found {
                Value::Boolean(true)
            } else if unknown {
                Value::Null
            } else {
                Value::Boolean(false)
            };
            if *negated { operators::execute_not(result) } else { Ok(result) }
        }
        Between { expr, low, high, negated } => {
            let v = evaluate(expr, scope, ctx)?;
            let lower = operators::execute_greater_than_or_equal(
                v.clone(),
                evaluate(low, scope, ctx)?,
            )?;
            let upper =
                operators::execute_less_than_or_equal(v, evaluate(high, scope, ctx)?)?;
            let result = operators::execute_and(lower, upper)?;
            if *negated { operators::execute_not(result) } else { Ok(result) }
        }

        Function(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, scope, ctx)?);
            }
            functions::execute_function(name, values, ctx)
        }

        Case { operand, when_clauses, else_clause } => {
            let operand_value = match operand {
                Some(e) => Some(evaluate(e, scope, ctx)?),
                None => None,
            };
            for (when, then) in when_clauses {
                let matched = match &operand_value {
                    Some(v) => {
                        operators::execute_equal(v.clone(), evaluate(when, scope, ctx)?)?
                    }
                    None => evaluate(when, scope, ctx)?,
                };
                if matched == Value::Boolean(true) {
                    return evaluate(then, scope, ctx);
                }
            }
            match else_clause {
                Some(e) => evaluate(e, scope, ctx),
                None => Ok(Value::Null),
            }
        }
    }
}

/// Evaluates a predicate for filtering: unknown (null) does not pass.
pub fn evaluate_predicate(expr: &Expression, scope: &Scope, ctx: &ExecutionContext) -> Result<bool> {
    match evaluate(expr, scope, ctx)? {
        Value::Boolean(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(Error::TypeMismatch {
            expected: "BOOLEAN".into(),
            found: other.data_type().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType};
    use chrono::NaiveDate;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("name", DataType::Text),
            Column::new("stock", DataType::Integer),
        ])
        .unwrap()
    }

    #[test]
    fn test_null_comparison_does_not_pass_filter() {
        let schema = schema();
        let row = vec![Value::text("laptop"), Value::Null];
        let scope = Scope::new(&schema, &row);
        let expr = Expression::column("stock").gt(Expression::literal(Value::Integer(0)));
        assert_eq!(evaluate(&expr, &scope, &ctx()), Ok(Value::Null));
        assert_eq!(evaluate_predicate(&expr, &scope, &ctx()), Ok(false));
        // IS NULL is definite, not unknown
        let expr = Expression::column("stock").is_null();
        assert_eq!(evaluate_predicate(&expr, &scope, &ctx()), Ok(true));
    }

    #[test]
    fn test_scope_chain_resolves_outer_row() {
        let inner_schema = schema();
        let outer_schema =
            Schema::new(vec![Column::new("o.threshold", DataType::Integer)]).unwrap();
        let inner_row = vec![Value::text("laptop"), Value::Integer(5)];
        let outer_row = vec![Value::Integer(3)];
        let outer = Scope::new(&outer_schema, &outer_row);
        let scope = Scope::with_outer(&inner_schema, &inner_row, &outer);
        let expr = Expression::column("stock").gt(Expression::column("threshold"));
        assert_eq!(evaluate(&expr, &scope, &ctx()), Ok(Value::Boolean(true)));
        assert_eq!(
            evaluate(&Expression::column("missing"), &scope, &ctx()),
            Err(Error::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn test_in_list_three_valued() {
        let schema = schema();
        let row = vec![Value::text("laptop"), Value::Integer(5)];
        let scope = Scope::new(&schema, &row);
        let in_list = |list: Vec<Value>, negated| Expression::InList {
            expr: Box::new(Expression::column("stock")),
            list: list.into_iter().map(Expression::Literal).collect(),
            negated,
        };
        let hit = in_list(vec![Value::Integer(5), Value::Null], false);
        assert_eq!(evaluate(&hit, &scope, &ctx()), Ok(Value::Boolean(true)));
        // A miss with a null member is unknown, not false
        let miss = in_list(vec![Value::Integer(7), Value::Null], false);
        assert_eq!(evaluate(&miss, &scope, &ctx()), Ok(Value::Null));
        let negated_miss = in_list(vec![Value::Integer(7), Value::Null], true);
        assert_eq!(evaluate(&negated_miss, &scope, &ctx()), Ok(Value::Null));
    }

    #[test]
    fn test_case_with_operand() {
        let schema = schema();
        let row = vec![Value::text("laptop"), Value::Integer(5)];
        let scope = Scope::new(&schema, &row);
        let expr = Expression::Case {
            operand: Some(Box::new(Expression::column("name"))),
            when_clauses: vec![
                (
                    Expression::literal(Value::text("mouse")),
                    Expression::literal(Value::Integer(1)),
                ),
                (
                    Expression::literal(Value::text("laptop")),
                    Expression::literal(Value::Integer(2)),
                ),
            ],
            else_clause: None,
        };
        assert_eq!(evaluate(&expr, &scope, &ctx()), Ok(Value::Integer(2)));
    }

    #[test]
    fn test_current_date_reads_context() {
        let schema = schema();
        let row = vec![Value::text("laptop"), Value::Integer(5)];
        let scope = Scope::new(&schema, &row);
        let expr = Expression::function("CURRENT_DATE", vec![]);
        assert_eq!(
            evaluate(&expr, &scope, &ctx()),
            Ok(Value::date(2024, 6, 15).unwrap())
        );
    }
}
