//! CONCAT(a, b, ...) - concatenate textual values

use super::{check_arity, check_textual, text_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Concat));
}

struct Concat;

impl Function for Concat {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "CONCAT" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("CONCAT", args.len(), 1..=usize::MAX)?;
        for arg in args {
            check_textual("CONCAT", arg)?;
        }
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        let mut out = String::new();
        for arg in &args {
            if arg.is_null() {
                return Ok(Value::Null);
            }
            out.push_str(text_arg("CONCAT", arg)?);
        }
        Ok(Value::Text(out))
    }
}
