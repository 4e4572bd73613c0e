//! YEAR(date) - calendar year

use super::{check_arity, check_date, date_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};
use chrono::Datelike;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Year));
}

struct Year;

impl Function for Year {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "YEAR" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("YEAR", args.len(), 1..=1)?;
        check_date("YEAR", &args[0])?;
        Ok(DataType::Integer)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let date = date_arg("YEAR", &args[0])?;
        Ok(Value::Integer(date.year() as i64))
    }
}
