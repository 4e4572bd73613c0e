//! LOWER(text) - lowercase

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Lower));
}

struct Lower;

impl Function for Lower {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "LOWER" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("LOWER", args.len(), 1..=1)?;
        check_textual("LOWER", &args[0])?;
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Text(text_arg("LOWER", &args[0])?.to_lowercase()))
    }
}
