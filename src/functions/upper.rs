//! UPPER(text) - uppercase

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Upper));
}

struct Upper;

impl Function for Upper {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "UPPER" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("UPPER", args.len(), 1..=1)?;
        check_textual("UPPER", &args[0])?;
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Text(text_arg("UPPER", &args[0])?.to_uppercase()))
    }
}
