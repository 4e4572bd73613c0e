//! MONTH(date) - month of year, 1..=12

use super::{check_arity, check_date, date_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};
use chrono::Datelike;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Month));
}

struct Month;

impl Function for Month {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "MONTH" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("MONTH", args.len(), 1..=1)?;
        check_date("MONTH", &args[0])?;
        Ok(DataType::Integer)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let date = date_arg("MONTH", &args[0])?;
        Ok(Value::Integer(date.month() as i64))
    }
}
