//! The expression tree
//!
//! Expressions are built programmatically (there is no SQL text parser) and
//! evaluated against a row scope. `infer_type` performs static inference
//! over a schema so plan nodes can report their output schema before any row
//! flows.

use super::data_type::DataType;
use super::schema::Schema;
use super::value::Value;
use crate::error::{Error, Result};
use crate::functions;
use crate::operators;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Value),
    /// Column reference by (possibly qualified) name, resolved against the
    /// evaluation scope.
    Column(String),

    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),

    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    LessThanOrEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),

    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
        negated: bool,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },

    /// Scalar function call, dispatched by name through the registry.
    Function(String, Vec<Expression>),

    Case {
        /// `CASE operand WHEN ...` compares each WHEN value against the
        /// operand; without an operand each WHEN is a boolean condition.
        operand: Option<Box<Expression>>,
        when_clauses: Vec<(Expression, Expression)>,
        else_clause: Option<Box<Expression>>,
    },
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(name.into(), args)
    }

    pub fn and(self, other: Expression) -> Self {
        Expression::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expression) -> Self {
        Expression::Or(Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: Expression) -> Self {
        Expression::Equal(Box::new(self), Box::new(other))
    }

    pub fn ne(self, other: Expression) -> Self {
        Expression::NotEqual(Box::new(self), Box::new(other))
    }

    pub fn lt(self, other: Expression) -> Self {
        Expression::LessThan(Box::new(self), Box::new(other))
    }

    pub fn le(self, other: Expression) -> Self {
        Expression::LessThanOrEqual(Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: Expression) -> Self {
        Expression::GreaterThan(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: Expression) -> Self {
        Expression::GreaterThanOrEqual(Box::new(self), Box::new(other))
    }

    pub fn add(self, other: Expression) -> Self {
        Expression::Add(Box::new(self), Box::new(other))
    }

    pub fn subtract(self, other: Expression) -> Self {
        Expression::Subtract(Box::new(self), Box::new(other))
    }

    pub fn multiply(self, other: Expression) -> Self {
        Expression::Multiply(Box::new(self), Box::new(other))
    }

    pub fn divide(self, other: Expression) -> Self {
        Expression::Divide(Box::new(self), Box::new(other))
    }

    pub fn is_null(self) -> Self {
        Expression::IsNull { expr: Box::new(self), negated: false }
    }

    pub fn is_not_null(self) -> Self {
        Expression::IsNull { expr: Box::new(self), negated: true }
    }

    pub fn like(self, pattern: Expression) -> Self {
        Expression::Like { expr: Box::new(self), pattern: Box::new(pattern), negated: false }
    }

    /// Infers the output type of this expression over `schema`, failing with
    /// `TypeMismatch` when operand types can never combine and
    /// `UnknownColumn` / `AmbiguousColumn` on bad references.
    pub fn infer_type(&self, schema: &Schema) -> Result<DataType> {
        use Expression::*;
        match self {
            Literal(v) => Ok(v.data_type()),
            Column(name) => Ok(schema.column(schema.index_of(name)?).datatype),

            And(l, r) => operators::validate_and(&l.infer_type(schema)?, &r.infer_type(schema)?),
            Or(l, r) => operators::validate_or(&l.infer_type(schema)?, &r.infer_type(schema)?),
            Not(e) => operators::validate_not(&e.infer_type(schema)?),

            Equal(l, r) | NotEqual(l, r) | LessThan(l, r) | LessThanOrEqual(l, r)
            | GreaterThan(l, r) | GreaterThanOrEqual(l, r) => {
                operators::validate_equal(&l.infer_type(schema)?, &r.infer_type(schema)?)
            }

            Add(l, r) => operators::validate_add(&l.infer_type(schema)?, &r.infer_type(schema)?),
            Subtract(l, r) => {
                operators::validate_subtract(&l.infer_type(schema)?, &r.infer_type(schema)?)
            }
            Multiply(l, r) => {
                operators::validate_multiply(&l.infer_type(schema)?, &r.infer_type(schema)?)
            }
            Divide(l, r) => {
                operators::validate_divide(&l.infer_type(schema)?, &r.infer_type(schema)?)
            }
            Negate(e) => operators::validate_negate(&e.infer_type(schema)?),

            IsNull { expr, .. } => {
                expr.infer_type(schema)?;
                Ok(DataType::Boolean)
            }
            Like { expr, pattern, .. } => {
                operators::validate_like(&expr.infer_type(schema)?, &pattern.infer_type(schema)?)
            }
            InList { expr, list, .. } => {
                let t = expr.infer_type(schema)?;
                for item in list {
                    operators::validate_equal(&t, &item.infer_type(schema)?)?;
                }
                Ok(DataType::Boolean)
            }
            Between { expr, low, high, .. } => {
                let t = expr.infer_type(schema)?;
                operators::validate_less_than_or_equal(&low.infer_type(schema)?, &t)?;
                operators::validate_less_than_or_equal(&t, &high.infer_type(schema)?)?;
                Ok(DataType::Boolean)
            }

            Function(name, args) => {
                let mut types = Vec::with_capacity(args.len());
                for arg in args {
                    types.push(arg.infer_type(schema)?);
                }
                functions::validate_function(name, &types)
            }

            Case { operand, when_clauses, else_clause } => {
                let operand_type = match operand {
                    Some(e) => Some(e.infer_type(schema)?),
                    None => None,
                };
                let mut result = DataType::Null;
                for (when, then) in when_clauses {
                    let when_type = when.infer_type(schema)?;
                    match &operand_type {
                        Some(t) => {
                            operators::validate_equal(t, &when_type)?;
                        }
                        None => {
                            operators::validate_not(&when_type)?;
                        }
                    }
                    result = unify_branch(result, then.infer_type(schema)?)?;
                }
                if let Some(e) = else_clause {
                    result = unify_branch(result, e.infer_type(schema)?)?;
                }
                Ok(result)
            }
        }
    }
}

/// Unifies the result types of two CASE branches. Null unifies with
/// anything; mixed integer/decimal branches widen to decimal.
fn unify_branch(current: DataType, next: DataType) -> Result<DataType> {
    match (current, next) {
        (DataType::Null, t) | (t, DataType::Null) => Ok(t),
        (a, b) if a == b => Ok(a),
        (a, b) if a.is_numeric() && b.is_numeric() => Ok(DataType::Decimal),
        (a, b) if a.is_textual() && b.is_textual() => Ok(DataType::Text),
        (a, b) => Err(Error::TypeMismatch { expected: a.to_string(), found: b.to_string() }),
    }
}

fn write_binary(
    f: &mut fmt::Formatter<'_>,
    left: &Expression,
    symbol: &str,
    right: &Expression,
) -> fmt::Result {
    write!(f, "({} {} {})", left, symbol, right)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expression::*;
        match self {
            Literal(v) => write!(f, "{}", v),
            Column(name) => write!(f, "{}", name),
            And(l, r) => write_binary(f, l, "AND", r),
            Or(l, r) => write_binary(f, l, "OR", r),
            Not(e) => write!(f, "NOT {}", e),
            Equal(l, r) => write_binary(f, l, "=", r),
            NotEqual(l, r) => write_binary(f, l, "<>", r),
            LessThan(l, r) => write_binary(f, l, "<", r),
            LessThanOrEqual(l, r) => write_binary(f, l, "<=", r),
            GreaterThan(l, r) => write_binary(f, l, ">", r),
            GreaterThanOrEqual(l, r) => write_binary(f, l, ">=", r),
            Add(l, r) => write_binary(f, l, "+", r),
            Subtract(l, r) => write_binary(f, l, "-", r),
            Multiply(l, r) => write_binary(f, l, "*", r),
            Divide(l, r) => write_binary(f, l, "/", r),
            Negate(e) => write!(f, "-{}", e),
            IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, if *negated { "NOT " } else { "" })
            }
            Like { expr, pattern, negated } => {
                write!(f, "{} {}LIKE {}", expr, if *negated { "NOT " } else { "" }, pattern)
            }
            InList { expr, list, negated } => {
                write!(f, "{} {}IN (", expr, if *negated { "NOT " } else { "" })?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Between { expr, low, high, negated } => {
                write!(
                    f,
                    "{} {}BETWEEN {} AND {}",
                    expr,
                    if *negated { "NOT " } else { "" },
                    low,
                    high
                )
            }
            Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Case { operand, when_clauses, else_clause } => {
                write!(f, "CASE")?;
                if let Some(e) = operand {
                    write!(f, " {}", e)?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = else_clause {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::schema::Column;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("name", DataType::Text),
            Column::new("price", DataType::Decimal),
            Column::new("stock", DataType::Integer),
        ])
        .unwrap()
    }

    #[test]
    fn test_infer_arithmetic() {
        let schema = schema();
        let expr = Expression::column("price").multiply(Expression::column("stock"));
        assert_eq!(expr.infer_type(&schema), Ok(DataType::Decimal));
        let expr = Expression::column("stock").add(Expression::literal(Value::Integer(1)));
        assert_eq!(expr.infer_type(&schema), Ok(DataType::Integer));
        // Division widens to decimal even on integers
        let expr = Expression::column("stock").divide(Expression::literal(Value::Integer(2)));
        assert_eq!(expr.infer_type(&schema), Ok(DataType::Decimal));
    }

    #[test]
    fn test_infer_rejects_mismatch() {
        let schema = schema();
        let expr = Expression::column("name").add(Expression::column("stock"));
        assert!(matches!(
            expr.infer_type(&schema),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_infer_unknown_column() {
        let expr = Expression::column("missing").is_null();
        assert_eq!(
            expr.infer_type(&schema()),
            Err(Error::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn test_infer_case_unifies_branches() {
        let schema = schema();
        let expr = Expression::Case {
            operand: None,
            when_clauses: vec![(
                Expression::column("stock").gt(Expression::literal(Value::Integer(0))),
                Expression::literal(Value::text("in stock")),
            )],
            else_clause: Some(Box::new(Expression::literal(Value::Null))),
        };
        assert_eq!(expr.infer_type(&schema), Ok(DataType::Text));
    }

    #[test]
    fn test_display() {
        let expr = Expression::column("price")
            .gt(Expression::literal(Value::Integer(100)))
            .and(Expression::column("name").like(Expression::literal(Value::text("lap%"))));
        assert_eq!(
            expr.to_string(),
            "((price > 100) AND name LIKE 'lap%')"
        );
    }
}
