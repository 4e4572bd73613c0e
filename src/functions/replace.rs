//! REPLACE(text, from, to) - replace every occurrence

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Replace));
}

struct Replace;

impl Function for Replace {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "REPLACE" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("REPLACE", args.len(), 3..=3)?;
        for arg in args {
            check_textual("REPLACE", arg)?;
        }
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        let text = text_arg("REPLACE", &args[0])?;
        let from = text_arg("REPLACE", &args[1])?;
        let to = text_arg("REPLACE", &args[2])?;
        if from.is_empty() {
            return Ok(Value::text(text));
        }
        Ok(Value::Text(text.replace(from, to)))
    }
}
