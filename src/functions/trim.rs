//! TRIM(text) - strip leading and trailing whitespace

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Trim));
}

struct Trim;

impl Function for Trim {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "TRIM" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("TRIM", args.len(), 1..=1)?;
        check_textual("TRIM", &args[0])?;
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Text(text_arg("TRIM", &args[0])?.trim().to_string()))
    }
}
