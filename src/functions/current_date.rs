//! CURRENT_DATE() - the execution context's current date
//!
//! The date comes from `ExecutionContext`, never from the wall clock, so the
//! same plan over the same tables always gives the same answer.

use super::{check_arity, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(CurrentDate));
}

struct CurrentDate;

impl Function for CurrentDate {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "CURRENT_DATE" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("CURRENT_DATE", args.len(), 0..=0)?;
        Ok(DataType::Date)
    }

    fn execute(&self, _args: Vec<Value>, ctx: &ExecutionContext) -> Result<Value> {
        Ok(Value::Date(ctx.current_date))
    }
}
