//! Scalar function registry
//!
//! One file per function. Each file exposes `register`, which installs the
//! function into the process-wide registry built once behind a `LazyLock`.
//! Function names are case-insensitive.

mod concat;
mod current_date;
mod date_add;
mod datediff;
mod day;
mod length;
mod lower;
mod month;
mod replace;
mod substring;
mod trim;
mod upper;
mod year;

use crate::error::{Error, Result};
use crate::types::{DataType, ExecutionContext, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

pub struct FunctionSignature {
    pub name: &'static str,
}

pub trait Function: Send + Sync {
    fn signature(&self) -> FunctionSignature;

    /// Infers the return type from argument types, or `TypeMismatch`.
    fn validate(&self, args: &[DataType]) -> Result<DataType>;

    fn execute(&self, args: Vec<Value>, ctx: &ExecutionContext) -> Result<Value>;
}

pub struct FunctionRegistry {
    functions: HashMap<&'static str, Box<dyn Function>>,
}

impl FunctionRegistry {
    fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    pub fn register(&mut self, function: Box<dyn Function>) {
        self.functions.insert(function.signature().name, function);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Function> {
        self.functions
            .get(name.to_ascii_uppercase().as_str())
            .map(|f| f.as_ref())
            .ok_or_else(|| Error::ExecutionError(format!("Unknown function: {}", name)))
    }
}

static REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(|| {
    let mut registry = FunctionRegistry::new();
    concat::register(&mut registry);
    current_date::register(&mut registry);
    date_add::register(&mut registry);
    datediff::register(&mut registry);
    day::register(&mut registry);
    length::register(&mut registry);
    lower::register(&mut registry);
    month::register(&mut registry);
    replace::register(&mut registry);
    substring::register(&mut registry);
    trim::register(&mut registry);
    upper::register(&mut registry);
    year::register(&mut registry);
    registry
});

pub fn validate_function(name: &str, args: &[DataType]) -> Result<DataType> {
    REGISTRY.get(name)?.validate(args)
}

pub fn execute_function(name: &str, args: Vec<Value>, ctx: &ExecutionContext) -> Result<Value> {
    REGISTRY.get(name)?.execute(args, ctx)
}

// Shared argument checks

fn check_arity(name: &str, actual: usize, expected: std::ops::RangeInclusive<usize>) -> Result<()> {
    if expected.contains(&actual) {
        Ok(())
    } else {
        Err(Error::ExecutionError(format!(
            "{} takes {}..{} arguments, got {}",
            name,
            expected.start(),
            expected.end(),
            actual
        )))
    }
}

fn check_textual(name: &str, arg: &DataType) -> Result<()> {
    if arg.is_textual() || *arg == DataType::Null {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: format!("textual argument for {}", name),
            found: arg.to_string(),
        })
    }
}

fn check_integer(name: &str, arg: &DataType) -> Result<()> {
    if *arg == DataType::Integer || *arg == DataType::Null {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: format!("integer argument for {}", name),
            found: arg.to_string(),
        })
    }
}

fn check_date(name: &str, arg: &DataType) -> Result<()> {
    if *arg == DataType::Date || *arg == DataType::Null {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: format!("date argument for {}", name),
            found: arg.to_string(),
        })
    }
}

/// Runtime coercion of a textual argument; the caller has already returned
/// null for null inputs.
fn text_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_text().ok_or_else(|| Error::TypeMismatch {
        expected: format!("textual argument for {}", name),
        found: value.data_type().to_string(),
    })
}

fn integer_arg(name: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        other => Err(Error::TypeMismatch {
            expected: format!("integer argument for {}", name),
            found: other.data_type().to_string(),
        }),
    }
}

fn date_arg(name: &str, value: &Value) -> Result<chrono::NaiveDate> {
    match value {
        Value::Date(d) => Ok(*d),
        other => Err(Error::TypeMismatch {
            expected: format!("date argument for {}", name),
            found: other.data_type().to_string(),
        }),
    }
}
