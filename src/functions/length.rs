//! LENGTH(text) - character count

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Length));
}

struct Length;

impl Function for Length {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "LENGTH" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("LENGTH", args.len(), 1..=1)?;
        check_textual("LENGTH", &args[0])?;
        Ok(DataType::Integer)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let text = text_arg("LENGTH", &args[0])?;
        Ok(Value::Integer(text.chars().count() as i64))
    }
}
