//! DAY(date) - day of month, 1..=31

use super::{check_arity, check_date, date_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};
use chrono::Datelike;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Day));
}

struct Day;

impl Function for Day {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "DAY" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("DAY", args.len(), 1..=1)?;
        check_date("DAY", &args[0])?;
        Ok(DataType::Integer)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let date = date_arg("DAY", &args[0])?;
        Ok(Value::Integer(date.day() as i64))
    }
}
